//! Pointer gesture routing for the four-pane grid.
//!
//! [`GestureRouter`] consumes the host's normalized pointer stream and
//! decides, per event, whether it pans the viewport, feeds a pinch, starts
//! a fling, or gets forwarded to the pane under the finger (mapped through
//! that pane's inverse transform). Pinch detection itself stays in the
//! host's gesture primitives; the router only consumes its begin / scale /
//! end callbacks.

mod fling;

pub use fling::{Fling, VelocityTracker};

use std::collections::HashMap;

use log::{debug, trace};

use crate::layout::Viewport;
use crate::types::{GridConfig, PaneKind, PointerEvent, PointerPhase};

/// Gesture recognition state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GestureState {
    /// No pointer down.
    #[default]
    Idle,
    /// A pointer is down but has not moved past the slop threshold.
    PossibleDrag,
    /// The pointer is panning the viewport.
    Dragging,
    /// A pinch is in progress; panning is suppressed.
    Scaling,
}

/// What the router wants the host to do in response to one input.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterAction {
    /// Deliver the event to `pane` at pane-local content coordinates.
    Forward {
        pane: PaneKind,
        x: f32,
        y: f32,
        event: PointerEvent,
    },
    /// Send one synthetic cancel to the panes so pressed-state visuals
    /// reset; emitted once per gesture.
    CancelChildren,
    /// The viewport moved; re-render.
    ViewportChanged,
    /// An inertial fling started.
    FlingStarted,
    /// The fling decayed to a stop or hit the pan clamp.
    FlingFinished,
}

/// Decide which pane owns a screen point and map the point into that
/// pane's content space.
///
/// The Corner pane's logical bottom-right corner is mapped through the
/// Corner transform to get the screen-space split point; each axis is then
/// compared independently. The comparison is strict, so a point exactly on
/// the split belongs to the Main side of that axis.
#[must_use]
pub fn dispatch_pane(
    viewport: &mut Viewport,
    corner_size: (f32, f32),
    x: f32,
    y: f32,
) -> (PaneKind, f32, f32) {
    let split = viewport
        .transform_for(PaneKind::Corner)
        .map(corner_size.0, corner_size.1);
    let pane = if y < split.1 {
        if x < split.0 {
            PaneKind::Corner
        } else {
            PaneKind::ColumnHeader
        }
    } else if x < split.0 {
        PaneKind::RowHeader
    } else {
        PaneKind::Main
    };
    let (local_x, local_y) = viewport.transform_for(pane).unmap(x, y);
    (pane, local_x, local_y)
}

/// Pointer state machine driving the viewport.
#[derive(Debug, Default)]
pub struct GestureRouter {
    state: GestureState,
    active_pointer: Option<u32>,
    /// Last known position of every live pointer, by id.
    pointers: HashMap<u32, (f32, f32)>,
    first_touch: (f32, f32),
    last_touch: (f32, f32),
    tracker: VelocityTracker,
    fling: Option<Fling>,
    /// One synthetic child-cancel per gesture.
    cancel_sent: bool,
    pinch_active: bool,
}

impl GestureRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current recognition state.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether an inertial fling is running.
    #[must_use]
    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// Feed one pointer event. `corner_size` is the Corner pane's logical
    /// (unscaled) size, used for pane dispatch of non-gesture events.
    pub fn handle_event(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        corner_size: (f32, f32),
        config: &GridConfig,
    ) -> Vec<RouterAction> {
        match event.phase {
            PointerPhase::Down => self.on_down(event, viewport, corner_size),
            PointerPhase::Move => self.on_move(event, viewport, config),
            PointerPhase::Up => self.on_up(event, viewport, corner_size, config),
            PointerPhase::Cancel => self.on_cancel(event, viewport, corner_size),
        }
    }

    fn on_down(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        corner_size: (f32, f32),
    ) -> Vec<RouterAction> {
        let mut actions = Vec::new();

        // Any new touch stops an in-flight fling before it can apply
        // another tick.
        if self.fling.take().is_some() {
            actions.push(RouterAction::FlingFinished);
        }

        self.pointers.insert(event.id, (event.x, event.y));

        if self.active_pointer.is_none() {
            self.active_pointer = Some(event.id);
            self.first_touch = (event.x, event.y);
            self.last_touch = (event.x, event.y);
            self.tracker.clear();
            self.tracker.push(event.timestamp_ms, event.x, event.y);
            self.cancel_sent = false;
            if !self.pinch_active {
                self.state = GestureState::PossibleDrag;
            }

            let (pane, x, y) = dispatch_pane(viewport, corner_size, event.x, event.y);
            trace!("pointer {} down -> {pane:?} ({x},{y})", event.id);
            actions.push(RouterAction::Forward { pane, x, y, event });
        }
        actions
    }

    fn on_move(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        config: &GridConfig,
    ) -> Vec<RouterAction> {
        // Unknown pointers (e.g. after an out-of-order up) are dropped.
        if !self.pointers.contains_key(&event.id) {
            return Vec::new();
        }
        self.pointers.insert(event.id, (event.x, event.y));
        if self.active_pointer != Some(event.id) {
            return Vec::new();
        }

        let mut actions = Vec::new();

        if self.pinch_active || self.state == GestureState::Scaling {
            // The pinch detector owns this event; just quiet the panes.
            if !self.cancel_sent {
                self.cancel_sent = true;
                actions.push(RouterAction::CancelChildren);
            }
            self.last_touch = (event.x, event.y);
            return actions;
        }

        if self.state == GestureState::PossibleDrag {
            let moved_x = (event.x - self.first_touch.0).abs();
            let moved_y = (event.y - self.first_touch.1).abs();
            if moved_x > config.touch_slop || moved_y > config.touch_slop {
                self.state = GestureState::Dragging;
                debug!("drag started after {moved_x}x{moved_y} px of slop");
            }
        }

        if self.state == GestureState::Dragging {
            if !self.cancel_sent {
                self.cancel_sent = true;
                actions.push(RouterAction::CancelChildren);
            }
            let version = viewport.version();
            // Content follows the finger.
            viewport.pan_by(event.x - self.last_touch.0, event.y - self.last_touch.1);
            if viewport.version() != version {
                actions.push(RouterAction::ViewportChanged);
            }
            self.tracker.push(event.timestamp_ms, event.x, event.y);
        }

        self.last_touch = (event.x, event.y);
        actions
    }

    fn on_up(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        corner_size: (f32, f32),
        config: &GridConfig,
    ) -> Vec<RouterAction> {
        if self.pointers.remove(&event.id).is_none() {
            return Vec::new();
        }

        let mut actions = Vec::new();

        if self.active_pointer == Some(event.id) && !self.pointers.is_empty() {
            // The active pointer lifted mid-gesture: hand tracking to a
            // remaining pointer instead of ending the gesture.
            if let Some((&id, &(x, y))) = self.pointers.iter().next() {
                self.active_pointer = Some(id);
                self.last_touch = (x, y);
                self.tracker.clear();
                trace!("active pointer handoff to {id}");
            }
            return actions;
        }

        if self.active_pointer != Some(event.id) {
            // A non-active pointer lifted; nothing else to do.
            return actions;
        }

        // Final pointer up.
        let was = self.state();
        match was {
            GestureState::Dragging => {
                self.tracker.push(event.timestamp_ms, event.x, event.y);
                let (vx, vy) = self.tracker.velocity();
                if !self.pinch_active {
                    if let Some(fling) = Fling::start(vx, vy, event.timestamp_ms, &config.fling) {
                        debug!("fling started at ({vx},{vy}) px/s");
                        self.fling = Some(fling);
                        actions.push(RouterAction::FlingStarted);
                    }
                }
            }
            GestureState::PossibleDrag => {
                // A tap: deliver the up to the pane under the finger.
                let (pane, x, y) = dispatch_pane(viewport, corner_size, event.x, event.y);
                actions.push(RouterAction::Forward { pane, x, y, event });
            }
            GestureState::Scaling | GestureState::Idle => {}
        }

        self.reset_gesture();
        actions
    }

    fn on_cancel(
        &mut self,
        event: PointerEvent,
        viewport: &mut Viewport,
        corner_size: (f32, f32),
    ) -> Vec<RouterAction> {
        if self.active_pointer.is_none() && self.pointers.is_empty() {
            return Vec::new();
        }
        self.pointers.clear();
        self.reset_gesture();
        let (pane, x, y) = dispatch_pane(viewport, corner_size, event.x, event.y);
        vec![RouterAction::Forward { pane, x, y, event }]
    }

    fn reset_gesture(&mut self) {
        self.state = GestureState::Idle;
        self.active_pointer = None;
        self.tracker.clear();
        self.cancel_sent = false;
    }

    /// The host's pinch detector reported a gesture start. Pre-empts drag
    /// handling and stops any fling.
    pub fn on_scale_begin(&mut self) -> Vec<RouterAction> {
        let mut actions = Vec::new();
        if self.fling.take().is_some() {
            actions.push(RouterAction::FlingFinished);
        }
        self.pinch_active = true;
        self.state = GestureState::Scaling;
        if !self.cancel_sent {
            self.cancel_sent = true;
            actions.push(RouterAction::CancelChildren);
        }
        actions
    }

    /// One pinch update: zoom about the focal point.
    pub fn on_scale(
        &mut self,
        focal_x: f32,
        focal_y: f32,
        factor: f32,
        viewport: &mut Viewport,
    ) -> Vec<RouterAction> {
        if !self.pinch_active {
            return Vec::new();
        }
        let version = viewport.version();
        viewport.zoom_at(focal_x, focal_y, factor);
        if viewport.version() != version {
            vec![RouterAction::ViewportChanged]
        } else {
            Vec::new()
        }
    }

    /// The pinch ended; remaining pointers continue as a drag.
    pub fn on_scale_end(&mut self) {
        self.pinch_active = false;
        if let Some((&id, &(x, y))) = self.pointers.iter().next() {
            self.active_pointer = Some(id);
            self.last_touch = (x, y);
            self.tracker.clear();
            self.state = GestureState::Dragging;
        } else {
            self.reset_gesture();
        }
    }

    /// Advance the fling by one frame tick. Each tick re-checks the clamp:
    /// an axis that stops moving zeroes its velocity, so the trajectory
    /// ends exactly at the boundary.
    pub fn tick(&mut self, now_ms: f64, viewport: &mut Viewport) -> Vec<RouterAction> {
        let Some(fling) = self.fling.as_mut() else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        match fling.tick(now_ms) {
            Some((dx, dy)) => {
                let before = (viewport.pan_x(), viewport.pan_y());
                viewport.pan_by(dx, dy);
                let after = (viewport.pan_x(), viewport.pan_y());
                let moved_x = (after.0 - before.0).abs() > f32::EPSILON;
                let moved_y = (after.1 - before.1).abs() > f32::EPSILON;
                let clamped_x = dx.abs() > f32::EPSILON && !moved_x;
                let clamped_y = dy.abs() > f32::EPSILON && !moved_y;
                if moved_x || moved_y {
                    actions.push(RouterAction::ViewportChanged);
                }
                fling.stop_axis(clamped_x, clamped_y);
                if fling.is_finished() {
                    self.fling = None;
                    actions.push(RouterAction::FlingFinished);
                }
            }
            None => {
                self.fling = None;
                actions.push(RouterAction::FlingFinished);
            }
        }
        actions
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::ContentBounds;

    fn viewport() -> Viewport {
        let mut vp = Viewport::new(0.5, 2.0);
        vp.set_frame(800.0, 600.0);
        vp.set_content_bounds(ContentBounds {
            width: 2000.0,
            height: 1500.0,
        });
        vp
    }

    fn ev(id: u32, x: f32, y: f32, phase: PointerPhase, t: f64) -> PointerEvent {
        PointerEvent::new(id, x, y, phase, t)
    }

    const CORNER: (f32, f32) = (80.0, 30.0);

    #[test]
    fn down_forwards_to_pane() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        let actions = router.handle_event(
            ev(1, 400.0, 300.0, PointerPhase::Down, 0.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(matches!(
            actions.as_slice(),
            [RouterAction::Forward {
                pane: PaneKind::Main,
                ..
            }]
        ));
        assert_eq!(router.state(), GestureState::PossibleDrag);
    }

    #[test]
    fn small_movement_stays_a_tap() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        let actions = router.handle_event(
            ev(1, 403.0, 301.0, PointerPhase::Move, 16.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(actions.is_empty());
        assert_eq!(router.state(), GestureState::PossibleDrag);
        assert_eq!(vp.pan_x(), 0.0);

        let actions = router.handle_event(
            ev(1, 403.0, 301.0, PointerPhase::Up, 32.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(matches!(actions.as_slice(), [RouterAction::Forward { .. }]));
        assert_eq!(router.state(), GestureState::Idle);
    }

    #[test]
    fn slop_exceeded_starts_drag_and_cancels_children_once() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        let actions = router.handle_event(
            ev(1, 380.0, 300.0, PointerPhase::Move, 16.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert_eq!(router.state(), GestureState::Dragging);
        assert!(actions.contains(&RouterAction::CancelChildren));
        assert!(actions.contains(&RouterAction::ViewportChanged));
        // Content followed the finger: 20 px left.
        assert_eq!(vp.pan_x(), -20.0);

        // The cancel is sent once per gesture.
        let actions = router.handle_event(
            ev(1, 360.0, 300.0, PointerPhase::Move, 32.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(!actions.contains(&RouterAction::CancelChildren));
        assert_eq!(vp.pan_x(), -40.0);
    }

    #[test]
    fn unknown_pointer_is_a_noop() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        let actions = router.handle_event(
            ev(7, 100.0, 100.0, PointerPhase::Move, 0.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(actions.is_empty());
        let actions = router.handle_event(
            ev(7, 100.0, 100.0, PointerPhase::Up, 0.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn pointer_handoff_keeps_gesture_alive() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        router.handle_event(ev(2, 500.0, 300.0, PointerPhase::Down, 5.0), &mut vp, CORNER, &config);
        router.handle_event(ev(1, 360.0, 300.0, PointerPhase::Move, 16.0), &mut vp, CORNER, &config);
        assert_eq!(router.state(), GestureState::Dragging);

        // Active pointer 1 lifts; pointer 2 takes over without a state
        // change and without a jump (last touch resets to 2's position).
        router.handle_event(ev(1, 360.0, 300.0, PointerPhase::Up, 32.0), &mut vp, CORNER, &config);
        assert_eq!(router.state(), GestureState::Dragging);
        let pan_before = vp.pan_x();
        router.handle_event(ev(2, 490.0, 300.0, PointerPhase::Move, 48.0), &mut vp, CORNER, &config);
        assert_eq!(vp.pan_x(), pan_before - 10.0);
    }

    #[test]
    fn fast_release_starts_fling_and_new_down_cancels_it() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 600.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        for i in 1..=5 {
            router.handle_event(
                ev(1, 600.0 - (i as f32) * 30.0, 300.0, PointerPhase::Move, f64::from(i) * 16.0),
                &mut vp,
                CORNER,
                &config,
            );
        }
        let actions = router.handle_event(
            ev(1, 450.0, 300.0, PointerPhase::Up, 96.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(actions.contains(&RouterAction::FlingStarted));
        assert!(router.is_flinging());

        let actions = router.handle_event(
            ev(2, 400.0, 300.0, PointerPhase::Down, 120.0),
            &mut vp,
            CORNER,
            &config,
        );
        assert!(actions.contains(&RouterAction::FlingFinished));
        assert!(!router.is_flinging());
    }

    #[test]
    fn fling_decelerates_and_stops_at_clamp() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        // Pan near the left clamp, then fling further left.
        vp.set_viewport(-1150.0, 0.0, 1.0);
        router.handle_event(ev(1, 600.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        for i in 1..=5 {
            router.handle_event(
                ev(1, 600.0 - (i as f32) * 40.0, 300.0, PointerPhase::Move, f64::from(i) * 16.0),
                &mut vp,
                CORNER,
                &config,
            );
        }
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Up, 96.0), &mut vp, CORNER, &config);
        assert!(router.is_flinging());

        let mut now = 96.0;
        let mut last_pan = vp.pan_x();
        let mut finished = false;
        for _ in 0..1000 {
            now += 16.0;
            let actions = router.tick(now, &mut vp);
            assert!(vp.pan_x() <= last_pan + f32::EPSILON, "no overshoot back");
            assert!(vp.pan_x() >= 800.0 - 2000.0, "never past the clamp");
            last_pan = vp.pan_x();
            if actions.contains(&RouterAction::FlingFinished) {
                finished = true;
                break;
            }
        }
        assert!(finished, "fling must terminate");
        assert_eq!(vp.pan_x(), 800.0 - 2000.0, "stopped exactly at the clamp");
    }

    #[test]
    fn pinch_preempts_drag() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        let actions = router.on_scale_begin();
        assert!(actions.contains(&RouterAction::CancelChildren));
        assert_eq!(router.state(), GestureState::Scaling);

        // Moves while scaling never pan.
        router.handle_event(ev(1, 300.0, 300.0, PointerPhase::Move, 16.0), &mut vp, CORNER, &config);
        assert_eq!(vp.pan_x(), 0.0);

        let actions = router.on_scale(400.0, 300.0, 1.5, &mut vp);
        assert!(actions.contains(&RouterAction::ViewportChanged));
        assert!((vp.scale() - 1.5).abs() < 1e-5);
    }

    #[test]
    fn scale_end_with_remaining_pointer_continues_drag() {
        let mut router = GestureRouter::new();
        let mut vp = viewport();
        let config = GridConfig::default();
        router.handle_event(ev(1, 400.0, 300.0, PointerPhase::Down, 0.0), &mut vp, CORNER, &config);
        router.handle_event(ev(2, 500.0, 300.0, PointerPhase::Down, 1.0), &mut vp, CORNER, &config);
        router.on_scale_begin();
        router.handle_event(ev(2, 500.0, 300.0, PointerPhase::Up, 30.0), &mut vp, CORNER, &config);
        router.on_scale_end();
        assert_eq!(router.state(), GestureState::Dragging);
    }

    // -- Pane dispatch --

    #[test]
    fn dispatch_selects_each_region() {
        let mut vp = viewport();
        assert_eq!(dispatch_pane(&mut vp, CORNER, 10.0, 10.0).0, PaneKind::Corner);
        assert_eq!(
            dispatch_pane(&mut vp, CORNER, 200.0, 10.0).0,
            PaneKind::ColumnHeader
        );
        assert_eq!(
            dispatch_pane(&mut vp, CORNER, 10.0, 200.0).0,
            PaneKind::RowHeader
        );
        assert_eq!(dispatch_pane(&mut vp, CORNER, 200.0, 200.0).0, PaneKind::Main);
    }

    #[test]
    fn dispatch_boundary_belongs_to_main() {
        let mut vp = viewport();
        // Exactly at the mapped corner bottom-right.
        assert_eq!(dispatch_pane(&mut vp, CORNER, 80.0, 30.0).0, PaneKind::Main);
        // Just inside resolves to Corner.
        assert_eq!(
            dispatch_pane(&mut vp, CORNER, 79.9, 29.9).0,
            PaneKind::Corner
        );
        // One axis on the boundary, one inside.
        assert_eq!(
            dispatch_pane(&mut vp, CORNER, 80.0, 29.9).0,
            PaneKind::ColumnHeader
        );
        assert_eq!(
            dispatch_pane(&mut vp, CORNER, 79.9, 30.0).0,
            PaneKind::RowHeader
        );
    }

    #[test]
    fn dispatch_maps_through_inverse_transform() {
        let mut vp = viewport();
        vp.set_viewport(-100.0, -50.0, 1.0);
        // Split point moves only with scale (corner never pans).
        let (pane, x, y) = dispatch_pane(&mut vp, CORNER, 200.0, 200.0);
        assert_eq!(pane, PaneKind::Main);
        assert_eq!(x, 300.0);
        assert_eq!(y, 250.0);

        // Row header unmaps with y pan only.
        let (pane, x, y) = dispatch_pane(&mut vp, CORNER, 10.0, 200.0);
        assert_eq!(pane, PaneKind::RowHeader);
        assert_eq!(x, 10.0);
        assert_eq!(y, 250.0);
    }
}
