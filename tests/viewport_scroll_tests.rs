//! Viewport clamp and zoom tests
//!
//! Verifies the pan clamp invariant across scales, the anchor-preserving
//! pinch-zoom contract, and the per-pane transform split.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use panegrid::{ContentBounds, PaneKind, Viewport};

/// Create a viewport over 2000x1500 content in an 800x600 frame.
fn create_viewport() -> Viewport {
    let mut vp = Viewport::new(0.5, 2.0);
    vp.set_frame(800.0, 600.0);
    vp.set_content_bounds(ContentBounds {
        width: 2000.0,
        height: 1500.0,
    });
    vp
}

/// The §4.1 clamp bounds for a given scale.
fn pan_bounds(vp: &Viewport) -> (f32, f32) {
    let (fw, fh) = vp.frame_size();
    let c = vp.content_bounds();
    (
        (fw - c.width * vp.scale()).min(0.0),
        (fh - c.height * vp.scale()).min(0.0),
    )
}

// =============================================================================
// CLAMP INVARIANT
// =============================================================================

#[test]
fn pan_never_escapes_clamp_range() {
    let mut vp = create_viewport();
    let scales = [0.5, 0.75, 1.0, 1.3, 2.0];
    let pans = [
        (0.0, 0.0),
        (-10.0, -10.0),
        (-5000.0, -5000.0),
        (300.0, 900.0),
        (f32::MIN, f32::MAX),
    ];
    for &scale in &scales {
        for &(px, py) in &pans {
            vp.set_viewport(px, py, scale);
            let (min_x, min_y) = pan_bounds(&vp);
            assert!(vp.pan_x() <= 0.0 && vp.pan_x() >= min_x, "x escaped");
            assert!(vp.pan_y() <= 0.0 && vp.pan_y() >= min_y, "y escaped");
            assert!(vp.scale() >= 0.5 && vp.scale() <= 2.0);
        }
    }
}

#[test]
fn zooming_out_reclamps_pan() {
    let mut vp = create_viewport();
    // Scroll to the bottom-right at scale 1.
    vp.set_viewport(-1200.0, -900.0, 1.0);
    assert_eq!(vp.pan_x(), -1200.0);
    // At scale 0.5 the content is 1000x750; the allowed range shrinks.
    vp.set_viewport(vp.pan_x(), vp.pan_y(), 0.5);
    let (min_x, min_y) = pan_bounds(&vp);
    assert_eq!(vp.pan_x(), min_x);
    assert_eq!(vp.pan_y(), min_y);
}

#[test]
fn content_smaller_than_frame_pins_to_top_left() {
    let mut vp = Viewport::new(0.5, 2.0);
    vp.set_frame(800.0, 600.0);
    vp.set_content_bounds(ContentBounds {
        width: 200.0,
        height: 100.0,
    });
    for &(px, py) in &[(-500.0, -500.0), (50.0, 50.0)] {
        vp.set_viewport(px, py, 1.0);
        assert_eq!(vp.pan_x(), 0.0);
        assert_eq!(vp.pan_y(), 0.0);
    }
}

#[test]
fn zero_frame_is_safe() {
    let mut vp = Viewport::new(0.5, 2.0);
    vp.set_content_bounds(ContentBounds {
        width: 1000.0,
        height: 1000.0,
    });
    vp.set_frame(0.0, 0.0);
    vp.set_viewport(-100.0, -100.0, 1.0);
    assert!(vp.pan_x().is_finite());
    assert!(vp.scale() == 1.0);
}

// =============================================================================
// ZOOM ANCHOR PROPERTY
// =============================================================================

#[test]
fn focal_content_point_is_fixed_across_factors() {
    for &factor in &[0.8, 0.9, 1.1, 1.25, 1.6] {
        let mut vp = create_viewport();
        vp.set_viewport(-400.0, -300.0, 1.0);
        let focal = (350.0, 250.0);

        let before = vp.transform_for(PaneKind::Main).unmap(focal.0, focal.1);
        vp.zoom_at(focal.0, focal.1, factor);
        let after = vp.transform_for(PaneKind::Main).unmap(focal.0, focal.1);

        assert!(
            (before.0 - after.0).abs() < 1e-2,
            "anchor drifted in x at factor {factor}: {before:?} vs {after:?}"
        );
        assert!(
            (before.1 - after.1).abs() < 1e-2,
            "anchor drifted in y at factor {factor}: {before:?} vs {after:?}"
        );
    }
}

#[test]
fn repeated_zoom_in_and_out_returns_close_to_start() {
    let mut vp = create_viewport();
    vp.set_viewport(-300.0, -200.0, 1.0);
    let focal = (400.0, 300.0);
    vp.zoom_at(focal.0, focal.1, 1.5);
    vp.zoom_at(focal.0, focal.1, 1.0 / 1.5);
    assert!((vp.scale() - 1.0).abs() < 1e-4);
    assert!((vp.pan_x() - -300.0).abs() < 0.5);
    assert!((vp.pan_y() - -200.0).abs() < 0.5);
}

#[test]
fn zoom_clamps_scale_at_bounds() {
    let mut vp = create_viewport();
    vp.zoom_at(100.0, 100.0, 100.0);
    assert_eq!(vp.scale(), 2.0);
    vp.zoom_at(100.0, 100.0, 1e-6);
    assert_eq!(vp.scale(), 0.5);
}

// =============================================================================
// PANE TRANSFORM SPLIT
// =============================================================================

#[test]
fn corner_never_moves() {
    let mut vp = create_viewport();
    vp.set_viewport(-250.0, -175.0, 1.25);
    let corner = vp.transform_for(PaneKind::Corner);
    assert_eq!((corner.tx, corner.ty), (0.0, 0.0));
    assert_eq!(corner.scale, 1.25);
}

#[test]
fn headers_pan_only_on_their_axis() {
    let mut vp = create_viewport();
    vp.set_viewport(-250.0, -175.0, 1.0);
    let col = vp.transform_for(PaneKind::ColumnHeader);
    let row = vp.transform_for(PaneKind::RowHeader);
    assert_eq!((col.tx, col.ty), (-250.0, 0.0));
    assert_eq!((row.tx, row.ty), (0.0, -175.0));
}

#[test]
fn main_transform_maps_content_to_screen() {
    let mut vp = create_viewport();
    vp.set_viewport(-100.0, -50.0, 2.0);
    let main = vp.transform_for(PaneKind::Main);
    let (sx, sy) = main.map(75.0, 30.0);
    assert_eq!(sx, 75.0 * 2.0 - 100.0);
    assert_eq!(sy, 30.0 * 2.0 - 50.0);
}

// =============================================================================
// SCROLL METRICS
// =============================================================================

#[test]
fn scroll_metrics_scale_with_zoom() {
    let mut vp = create_viewport();
    vp.set_viewport(-100.0, -80.0, 1.0);
    vp.zoom_at(0.0, 0.0, 2.0);
    let m = vp.scroll_metrics();
    assert_eq!(m.horizontal_range, 4000.0);
    assert_eq!(m.vertical_range, 3000.0);
    assert_eq!(m.horizontal_offset, -vp.pan_x());
    assert_eq!(m.vertical_offset, -vp.pan_y());
}
