//! Gesture routing tests through the full grid
//!
//! Drives `PaneGrid` with synthetic pointer streams and asserts the
//! resulting viewport state, routed events, and fling behavior.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use panegrid::{
    Cell, GridConfig, GridEvent, Pane, PaneGrid, PaneKind, PointerEvent, PointerPhase, Row,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn uniform_pane(rows: usize, cols: usize, w: f32, h: f32) -> Pane {
    Pane::new(
        (0..rows)
            .map(|_| Row::new(vec![Cell::new(w, h); cols]))
            .collect(),
    )
}

/// A 40x10 grid: content 80+40*64 = 2640 wide, 24+40*20 = 824 tall, in a
/// 400x300 frame so both axes scroll.
fn scrolling_grid() -> PaneGrid {
    let mut grid = PaneGrid::new(GridConfig::default());
    grid.set_frame(400.0, 300.0);
    grid.attach_panes(
        uniform_pane(40, 40, 64.0, 20.0),
        uniform_pane(1, 40, 64.0, 24.0),
        uniform_pane(40, 1, 80.0, 20.0),
        uniform_pane(1, 1, 80.0, 24.0),
    )
    .unwrap();
    grid
}

fn ev(id: u32, x: f32, y: f32, phase: PointerPhase, t: f64) -> PointerEvent {
    PointerEvent::new(id, x, y, phase, t)
}

fn routed_pane(events: &[GridEvent]) -> Option<PaneKind> {
    events.iter().find_map(|e| match e {
        GridEvent::PointerRouted { pane, .. } => Some(*pane),
        _ => None,
    })
}

// ============================================================================
// DRAG
// ============================================================================

#[test]
fn drag_pans_and_suppresses_child_delivery() {
    let mut grid = scrolling_grid();
    grid.handle_pointer(ev(1, 200.0, 150.0, PointerPhase::Down, 0.0));
    let events = grid.handle_pointer(ev(1, 170.0, 150.0, PointerPhase::Move, 16.0));

    assert!(events.contains(&GridEvent::ChildrenCancelled));
    assert!(events.contains(&GridEvent::ViewportChanged));
    assert!(!events
        .iter()
        .any(|e| matches!(e, GridEvent::PointerRouted { .. })));
    assert_eq!(grid.viewport().pan_x(), -30.0);
}

#[test]
fn slow_drag_below_slop_keeps_tap_semantics() {
    let mut grid = scrolling_grid();
    grid.handle_pointer(ev(1, 200.0, 150.0, PointerPhase::Down, 0.0));
    grid.handle_pointer(ev(1, 204.0, 152.0, PointerPhase::Move, 16.0));
    let events = grid.handle_pointer(ev(1, 204.0, 152.0, PointerPhase::Up, 32.0));
    assert_eq!(routed_pane(&events), Some(PaneKind::Main));
    assert_eq!(grid.viewport().pan_x(), 0.0);
}

#[test]
fn drag_updates_sticky_headers() {
    let mut grid = scrolling_grid();
    grid.set_sticky_row_indices(&[0, 4]);

    // Drag content up by 120 px: rows 0..6 scroll past, first visible = 6.
    grid.handle_pointer(ev(1, 200.0, 280.0, PointerPhase::Down, 0.0));
    let events = grid.handle_pointer(ev(1, 200.0, 160.0, PointerPhase::Move, 16.0));

    assert!(events
        .iter()
        .any(|e| matches!(e, GridEvent::RowHeaderRebuilt { active_row: 4, .. })));
    assert_eq!(grid.active_sticky_row(), 4);
}

// ============================================================================
// FLING
// ============================================================================

#[test]
fn fling_pans_monotonically_until_finished() {
    let mut grid = scrolling_grid();
    grid.handle_pointer(ev(1, 380.0, 150.0, PointerPhase::Down, 0.0));
    for i in 1..=6 {
        grid.handle_pointer(ev(
            1,
            380.0 - 40.0 * i as f32,
            150.0,
            PointerPhase::Move,
            f64::from(i) * 16.0,
        ));
    }
    let events = grid.handle_pointer(ev(1, 140.0, 150.0, PointerPhase::Up, 112.0));
    assert!(events.contains(&GridEvent::FlingStarted));
    assert!(grid.is_flinging());

    let mut now = 112.0;
    let mut last_pan = grid.viewport().pan_x();
    let mut finished = false;
    for _ in 0..2000 {
        now += 16.0;
        let events = grid.tick(now);
        let pan = grid.viewport().pan_x();
        assert!(pan <= last_pan + f32::EPSILON, "fling reversed direction");
        last_pan = pan;
        if events.contains(&GridEvent::FlingFinished) {
            finished = true;
            break;
        }
    }
    assert!(finished, "fling must terminate");
    assert!(!grid.is_flinging());
}

#[test]
fn tick_without_fling_is_a_noop() {
    let mut grid = scrolling_grid();
    assert!(grid.tick(16.0).is_empty());
}

// ============================================================================
// PINCH
// ============================================================================

#[test]
fn pinch_zooms_about_focal_point_and_blocks_pan() {
    let mut grid = scrolling_grid();
    grid.handle_pointer(ev(1, 150.0, 150.0, PointerPhase::Down, 0.0));
    grid.handle_pointer(ev(2, 250.0, 150.0, PointerPhase::Down, 1.0));
    grid.on_scale_begin();

    // Moves during the pinch never pan.
    grid.handle_pointer(ev(1, 100.0, 150.0, PointerPhase::Move, 16.0));
    assert_eq!(grid.viewport().pan_x(), 0.0);

    let events = grid.on_scale(200.0, 150.0, 1.5);
    assert!(events.contains(&GridEvent::ViewportChanged));
    assert_eq!(grid.viewport().scale(), 1.5);
    grid.on_scale_end();
}

#[test]
fn pinch_scale_clamps_at_configured_bounds() {
    let mut grid = scrolling_grid();
    grid.on_scale_begin();
    for _ in 0..20 {
        grid.on_scale(200.0, 150.0, 1.4);
    }
    assert_eq!(grid.viewport().scale(), grid.max_scale());
    for _ in 0..40 {
        grid.on_scale(200.0, 150.0, 0.6);
    }
    assert_eq!(grid.viewport().scale(), grid.min_scale());
    grid.on_scale_end();
}

// ============================================================================
// PANE DISPATCH
// ============================================================================

#[test]
fn taps_route_to_the_pane_under_the_finger() {
    let mut grid = scrolling_grid();
    // Corner is 80x24 at scale 1.
    let cases = [
        (40.0, 12.0, PaneKind::Corner),
        (200.0, 12.0, PaneKind::ColumnHeader),
        (40.0, 200.0, PaneKind::RowHeader),
        (200.0, 200.0, PaneKind::Main),
    ];
    for (i, &(x, y, expected)) in cases.iter().enumerate() {
        let t = (i as f64) * 100.0;
        let events = grid.handle_pointer(ev(1, x, y, PointerPhase::Down, t));
        assert_eq!(routed_pane(&events), Some(expected), "down at ({x},{y})");
        grid.handle_pointer(ev(1, x, y, PointerPhase::Up, t + 10.0));
    }
}

#[test]
fn corner_boundary_belongs_to_main() {
    let mut grid = scrolling_grid();
    let events = grid.handle_pointer(ev(1, 80.0, 24.0, PointerPhase::Down, 0.0));
    assert_eq!(routed_pane(&events), Some(PaneKind::Main));
    grid.handle_pointer(ev(1, 80.0, 24.0, PointerPhase::Up, 10.0));

    let events = grid.handle_pointer(ev(1, 79.9, 23.9, PointerPhase::Down, 20.0));
    assert_eq!(routed_pane(&events), Some(PaneKind::Corner));
    grid.handle_pointer(ev(1, 79.9, 23.9, PointerPhase::Up, 30.0));
}

#[test]
fn dispatch_split_follows_zoom() {
    let mut grid = scrolling_grid();
    grid.on_scale_begin();
    grid.on_scale(0.0, 0.0, 2.0);
    grid.on_scale_end();
    // At scale 2 the corner occupies 160x48 of screen.
    let events = grid.handle_pointer(ev(1, 150.0, 40.0, PointerPhase::Down, 0.0));
    assert_eq!(routed_pane(&events), Some(PaneKind::Corner));
}

#[test]
fn routed_coordinates_are_pane_local() {
    let mut grid = scrolling_grid();
    // Scroll right/down a bit, then tap in the main area.
    grid.set_external_viewport(0.0, 0.0, 1.0);
    grid.handle_pointer(ev(1, 200.0, 150.0, PointerPhase::Down, 0.0));
    for i in 1..=3 {
        grid.handle_pointer(ev(
            1,
            200.0 - 20.0 * i as f32,
            150.0 - 20.0 * i as f32,
            PointerPhase::Move,
            f64::from(i) * 16.0,
        ));
    }
    grid.handle_pointer(ev(1, 140.0, 90.0, PointerPhase::Up, 64.0));
    let (pan_x, pan_y) = (grid.viewport().pan_x(), grid.viewport().pan_y());
    assert_eq!((pan_x, pan_y), (-60.0, -60.0));

    let events = grid.handle_pointer(ev(2, 300.0, 250.0, PointerPhase::Down, 200.0));
    let routed = events.iter().find_map(|e| match e {
        GridEvent::PointerRouted { pane, x, y, .. } => Some((*pane, *x, *y)),
        _ => None,
    });
    let (pane, x, y) = routed.unwrap();
    assert_eq!(pane, PaneKind::Main);
    assert_eq!(x, 360.0);
    assert_eq!(y, 310.0);
}

// ============================================================================
// POINTER-STREAM ANOMALIES
// ============================================================================

#[test]
fn events_for_unknown_pointers_are_dropped() {
    let mut grid = scrolling_grid();
    assert!(grid
        .handle_pointer(ev(9, 100.0, 100.0, PointerPhase::Move, 0.0))
        .is_empty());
    assert!(grid
        .handle_pointer(ev(9, 100.0, 100.0, PointerPhase::Up, 1.0))
        .is_empty());
    assert_eq!(grid.viewport().pan_x(), 0.0);
}

#[test]
fn moves_after_cancel_are_dropped() {
    let mut grid = scrolling_grid();
    grid.handle_pointer(ev(1, 200.0, 150.0, PointerPhase::Down, 0.0));
    grid.handle_pointer(ev(1, 200.0, 150.0, PointerPhase::Cancel, 8.0));
    let events = grid.handle_pointer(ev(1, 100.0, 150.0, PointerPhase::Move, 16.0));
    assert!(events.is_empty());
    assert_eq!(grid.viewport().pan_x(), 0.0);
}
