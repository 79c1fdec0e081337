//! `PaneGrid` - the primary entry point for the four-pane grid engine.
//!
//! Owns the four panes, the shared viewport, the harmonized layout tables,
//! the sticky-header state and the gesture router, and presents the
//! host-facing API:
//! - attach pane content and column overrides, then read back the
//!   harmonized layout and per-pane transforms for rendering
//! - feed raw pointer events and pinch callbacks, receive [`GridEvent`]s
//! - drive inertial scrolling from the host frame loop via
//!   [`PaneGrid::tick`]
//!
//! Everything is single-threaded and host-driven; no event is processed
//! concurrently with another.

use std::collections::HashMap;

use log::debug;

use crate::error::{GridError, Result};
use crate::gesture::{GestureRouter, RouterAction};
use crate::layout::{AlignmentEngine, GridLayout, ScrollMetrics, Transform, Viewport};
use crate::sticky::{
    first_visible_index, rebuild_column_header, rebuild_row_header, StickySelector,
};
use crate::types::{GridConfig, Pane, PaneKind, Panes, PointerEvent};

/// Notification produced by the grid for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A non-gesture pointer event, mapped into `pane`'s content space.
    PointerRouted {
        pane: PaneKind,
        x: f32,
        y: f32,
        event: PointerEvent,
    },
    /// Reset any pressed-state visuals in the panes.
    ChildrenCancelled,
    /// Pan or scale changed; re-render with fresh transforms.
    ViewportChanged,
    /// Inertial scrolling started; keep calling [`PaneGrid::tick`].
    FlingStarted,
    /// Inertial scrolling ended.
    FlingFinished,
    /// The active sticky row changed; the row header pane was rebuilt.
    RowHeaderRebuilt {
        active_row: usize,
        rows: Vec<crate::types::Row>,
    },
    /// The active sticky column changed; the column header pane was
    /// rebuilt.
    ColumnHeaderRebuilt {
        active_column: usize,
        rows: Vec<crate::types::Row>,
    },
}

/// The four-pane grid engine.
pub struct PaneGrid {
    config: GridConfig,
    engine: AlignmentEngine,
    panes: Option<Panes<Pane>>,
    overrides: HashMap<usize, f32>,
    layout: GridLayout,
    viewport: Viewport,
    selector: StickySelector,
    router: GestureRouter,
    use_external_viewport: bool,
}

impl Default for PaneGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl PaneGrid {
    /// Create an empty grid with the given configuration.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let viewport = Viewport::new(config.min_scale, config.max_scale);
        let engine = AlignmentEngine::new(config.span_width_policy);
        Self {
            config,
            engine,
            panes: None,
            overrides: HashMap::new(),
            layout: GridLayout::default(),
            viewport,
            selector: StickySelector::default(),
            router: GestureRouter::new(),
            use_external_viewport: false,
        }
    }

    /// Attach the four panes that make up the grid. One-shot: the pane
    /// structure is fixed, so a second call is rejected rather than
    /// silently restacking content.
    ///
    /// Applies column overrides, harmonizes sizes, computes offsets and
    /// content bounds, and performs the initial sticky selection.
    ///
    /// # Errors
    /// `Unsupported` when panes are already attached; `InvalidSpan` /
    /// `NegativeOverride` for invalid configuration (existing state is
    /// untouched).
    pub fn attach_panes(
        &mut self,
        main: Pane,
        column_header: Pane,
        row_header: Pane,
        corner: Pane,
    ) -> Result<Vec<GridEvent>> {
        if self.panes.is_some() {
            return Err(GridError::Unsupported(
                "panes are already attached; create a new grid instead".to_string(),
            ));
        }
        let mut panes = Panes {
            main,
            column_header,
            row_header,
            corner,
        };
        AlignmentEngine::validate(&panes, &self.overrides)?;
        self.apply_overrides(&mut panes);
        let layout = self.engine.harmonize(&panes, &self.overrides)?;
        debug!(
            "panes attached: content {}x{}",
            layout.content.width, layout.content.height
        );
        self.viewport.set_content_bounds(layout.content);
        self.layout = layout;
        self.panes = Some(panes);

        let mut events = vec![GridEvent::ViewportChanged];
        events.extend(self.refresh_sticky());
        Ok(events)
    }

    fn apply_overrides(&self, panes: &mut Panes<Pane>) {
        for kind in [
            PaneKind::Main,
            PaneKind::ColumnHeader,
            PaneKind::RowHeader,
            PaneKind::Corner,
        ] {
            AlignmentEngine::apply_overrides(panes.get_mut(kind), &self.overrides);
        }
    }

    /// Replace the column width override map and re-harmonize.
    ///
    /// # Errors
    /// `NegativeOverride` for any negative value; the previous overrides
    /// stay in effect on error.
    pub fn set_column_width_overrides(
        &mut self,
        overrides: HashMap<usize, f32>,
    ) -> Result<Vec<GridEvent>> {
        for (&column, &width) in &overrides {
            if width < 0.0 {
                return Err(GridError::NegativeOverride { column, width });
            }
        }
        self.overrides = overrides;
        let engine = self.engine;
        let layout = {
            let Some(panes) = self.panes.as_mut() else {
                return Ok(Vec::new());
            };
            for kind in [
                PaneKind::Main,
                PaneKind::ColumnHeader,
                PaneKind::RowHeader,
                PaneKind::Corner,
            ] {
                AlignmentEngine::apply_overrides(panes.get_mut(kind), &self.overrides);
            }
            engine.harmonize(panes, &self.overrides)?
        };
        self.viewport.set_content_bounds(layout.content);
        self.layout = layout;

        let mut events = vec![GridEvent::ViewportChanged];
        events.extend(self.refresh_sticky());
        Ok(events)
    }

    /// Configure which row indices may become the pinned header row. The
    /// greatest index scrolled past the top becomes active.
    pub fn set_sticky_row_indices(&mut self, indices: &[usize]) -> Vec<GridEvent> {
        let first = self.first_visible_row();
        let changed = self.selector.set_row_indices(indices, first);
        if changed {
            self.rebuild_row_header_events()
        } else {
            Vec::new()
        }
    }

    /// Configure which column indices may become the pinned header column.
    pub fn set_sticky_column_indices(&mut self, indices: &[usize]) -> Vec<GridEvent> {
        let first = self.first_visible_column();
        let changed = self.selector.set_column_indices(indices, first);
        if changed {
            self.rebuild_column_header_events()
        } else {
            Vec::new()
        }
    }

    /// Set the visible frame size the panes are drawn into.
    pub fn set_frame(&mut self, width: f32, height: f32) -> Vec<GridEvent> {
        let version = self.viewport.version();
        self.viewport.set_frame(width, height);
        let mut events = Vec::new();
        if self.viewport.version() != version {
            events.push(GridEvent::ViewportChanged);
            events.extend(self.refresh_sticky());
        }
        events
    }

    pub fn set_min_scale(&mut self, min_scale: f32) {
        self.config.min_scale = min_scale;
        self.viewport.set_min_scale(min_scale);
    }

    #[must_use]
    pub fn min_scale(&self) -> f32 {
        self.config.min_scale
    }

    pub fn set_max_scale(&mut self, max_scale: f32) {
        self.config.max_scale = max_scale;
        self.viewport.set_max_scale(max_scale);
    }

    #[must_use]
    pub fn max_scale(&self) -> f32 {
        self.config.max_scale
    }

    /// Unscaled width of the full grid content.
    #[must_use]
    pub fn content_width(&self) -> f32 {
        self.layout.content.width
    }

    /// Unscaled height of the full grid content.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.layout.content.height
    }

    /// The harmonized layout tables.
    #[must_use]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The attached pane content, if any.
    #[must_use]
    pub fn panes(&self) -> Option<&Panes<Pane>> {
        self.panes.as_ref()
    }

    /// Read-only viewport state.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The affine map to apply before drawing one pane.
    pub fn transform_for(&mut self, pane: PaneKind) -> Transform {
        self.viewport.transform_for(pane)
    }

    /// Scrollbar ranges and offsets, `(extent·scale, -pan)` per axis.
    #[must_use]
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        self.viewport.scroll_metrics()
    }

    /// Currently active sticky row index.
    #[must_use]
    pub fn active_sticky_row(&self) -> usize {
        self.selector.active_row()
    }

    /// Currently active sticky column index.
    #[must_use]
    pub fn active_sticky_column(&self) -> usize {
        self.selector.active_column()
    }

    /// Hand viewport ownership to an external container. While enabled the
    /// grid stops consuming gestures; pointer events are still mapped and
    /// routed to panes, and pan/zoom arrives via
    /// [`PaneGrid::set_external_viewport`].
    pub fn set_use_external_viewport(&mut self, enabled: bool) {
        self.use_external_viewport = enabled;
    }

    #[must_use]
    pub fn use_external_viewport(&self) -> bool {
        self.use_external_viewport
    }

    /// Push externally managed pan/zoom into the grid (container mode).
    /// Values are clamped exactly like internal gestures.
    pub fn set_external_viewport(&mut self, pan_x: f32, pan_y: f32, scale: f32) -> Vec<GridEvent> {
        let version = self.viewport.version();
        self.viewport.set_viewport(pan_x, pan_y, scale);
        let mut events = Vec::new();
        if self.viewport.version() != version {
            events.push(GridEvent::ViewportChanged);
        }
        events.extend(self.refresh_sticky());
        events
    }

    /// Feed one raw pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Vec<GridEvent> {
        let corner = (self.layout.corner_width(), self.layout.corner_height());
        if self.use_external_viewport {
            // External mode: no gesture consumption, only pane routing.
            let (pane, x, y) =
                crate::gesture::dispatch_pane(&mut self.viewport, corner, event.x, event.y);
            return vec![GridEvent::PointerRouted { pane, x, y, event }];
        }
        let actions = self
            .router
            .handle_event(event, &mut self.viewport, corner, &self.config);
        self.finish_actions(actions)
    }

    /// The host's pinch detector began a scale gesture.
    pub fn on_scale_begin(&mut self) -> Vec<GridEvent> {
        if self.use_external_viewport {
            return Vec::new();
        }
        let actions = self.router.on_scale_begin();
        self.finish_actions(actions)
    }

    /// One pinch update; drives the anchor-preserving zoom.
    pub fn on_scale(&mut self, focal_x: f32, focal_y: f32, factor: f32) -> Vec<GridEvent> {
        if self.use_external_viewport {
            return Vec::new();
        }
        let actions = self.router.on_scale(focal_x, focal_y, factor, &mut self.viewport);
        self.finish_actions(actions)
    }

    /// The pinch ended.
    pub fn on_scale_end(&mut self) {
        if !self.use_external_viewport {
            self.router.on_scale_end();
        }
    }

    /// Advance inertial scrolling by one frame. Call from the host frame
    /// loop while a fling is running (after [`GridEvent::FlingStarted`]).
    pub fn tick(&mut self, now_ms: f64) -> Vec<GridEvent> {
        if self.use_external_viewport {
            return Vec::new();
        }
        let actions = self.router.tick(now_ms, &mut self.viewport);
        self.finish_actions(actions)
    }

    /// Whether a fling is currently running.
    #[must_use]
    pub fn is_flinging(&self) -> bool {
        self.router.is_flinging()
    }

    /// Convert router actions to grid events and fold in any sticky-header
    /// change the viewport movement caused.
    fn finish_actions(&mut self, actions: Vec<RouterAction>) -> Vec<GridEvent> {
        let mut events = Vec::with_capacity(actions.len());
        let mut viewport_moved = false;
        for action in actions {
            match action {
                RouterAction::Forward { pane, x, y, event } => {
                    events.push(GridEvent::PointerRouted { pane, x, y, event });
                }
                RouterAction::CancelChildren => events.push(GridEvent::ChildrenCancelled),
                RouterAction::ViewportChanged => {
                    viewport_moved = true;
                    events.push(GridEvent::ViewportChanged);
                }
                RouterAction::FlingStarted => events.push(GridEvent::FlingStarted),
                RouterAction::FlingFinished => events.push(GridEvent::FlingFinished),
            }
        }
        if viewport_moved {
            events.extend(self.refresh_sticky());
        }
        events
    }

    fn first_visible_row(&self) -> usize {
        first_visible_index(
            &self.layout.main_rows,
            self.viewport.pan_y(),
            self.viewport.scale(),
        )
    }

    fn first_visible_column(&self) -> usize {
        first_visible_index(
            &self.layout.main_columns,
            self.viewport.pan_x(),
            self.viewport.scale(),
        )
    }

    /// Recompute the active sticky indices from the current scroll
    /// position; rebuild header panes when they changed.
    fn refresh_sticky(&mut self) -> Vec<GridEvent> {
        let change = self
            .selector
            .select(self.first_visible_row(), self.first_visible_column());
        let mut events = Vec::new();
        if change.row_changed {
            events.extend(self.rebuild_row_header_events());
        }
        if change.column_changed {
            events.extend(self.rebuild_column_header_events());
        }
        events
    }

    fn rebuild_row_header_events(&mut self) -> Vec<GridEvent> {
        let Some(panes) = self.panes.as_mut() else {
            return Vec::new();
        };
        let active_row = self.selector.active_row();
        let rebuilt = rebuild_row_header(&panes.main, active_row);
        let rows = rebuilt.rows.clone();
        panes.row_header = rebuilt;
        vec![GridEvent::RowHeaderRebuilt { active_row, rows }]
    }

    fn rebuild_column_header_events(&mut self) -> Vec<GridEvent> {
        let Some(panes) = self.panes.as_mut() else {
            return Vec::new();
        };
        let active_column = self.selector.active_column();
        let rebuilt = rebuild_column_header(&panes.main, active_column);
        let rows = rebuilt.rows.clone();
        panes.column_header = rebuilt;
        vec![GridEvent::ColumnHeaderRebuilt {
            active_column,
            rows,
        }]
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
    use crate::types::{Cell, Row};

    fn uniform_pane(rows: usize, cols: usize, w: f32, h: f32) -> Pane {
        Pane::new(
            (0..rows)
                .map(|_| Row::new(vec![Cell::new(w, h); cols]))
                .collect(),
        )
    }

    fn grid() -> PaneGrid {
        let mut grid = PaneGrid::new(GridConfig::default());
        grid.set_frame(800.0, 600.0);
        grid.attach_panes(
            uniform_pane(10, 5, 64.0, 20.0),
            uniform_pane(1, 5, 64.0, 24.0),
            uniform_pane(10, 1, 80.0, 20.0),
            uniform_pane(1, 1, 80.0, 24.0),
        )
        .unwrap();
        grid
    }

    #[test]
    fn attach_twice_is_unsupported() {
        let mut g = grid();
        let err = g
            .attach_panes(
                Pane::default(),
                Pane::default(),
                Pane::default(),
                Pane::default(),
            )
            .unwrap_err();
        assert!(matches!(err, GridError::Unsupported(_)));
        // Existing state is intact.
        assert_eq!(g.content_width(), 80.0 + 5.0 * 64.0);
    }

    #[test]
    fn content_bounds_cover_both_pairings() {
        let g = grid();
        assert_eq!(g.content_width(), 400.0);
        assert_eq!(g.content_height(), 24.0 + 200.0);
    }

    #[test]
    fn scroll_metrics_match_viewport() {
        let mut g = grid();
        g.set_external_viewport(0.0, 0.0, 1.0);
        let m = g.scroll_metrics();
        assert_eq!(m.horizontal_range, 400.0);
        assert_eq!(m.vertical_range, 224.0);
    }

    #[test]
    fn external_viewport_routes_but_does_not_pan() {
        let mut g = grid();
        // Shrink the frame so there is scrollable range to push into.
        g.set_frame(300.0, 150.0);
        g.set_use_external_viewport(true);
        let events = g.handle_pointer(PointerEvent::new(
            1,
            200.0,
            100.0,
            crate::types::PointerPhase::Move,
            0.0,
        ));
        assert!(matches!(
            events.as_slice(),
            [GridEvent::PointerRouted { .. }]
        ));
        assert_eq!(g.viewport().pan_x(), 0.0);

        let events = g.set_external_viewport(-50.0, -30.0, 1.0);
        assert!(events.contains(&GridEvent::ViewportChanged));
        assert_eq!(g.viewport().pan_x(), -50.0);
    }
}
