//! panegrid - four-pane grid viewport engine
//!
//! Renders-nothing core for a large tabular grid split into four
//! coordinated panes - main body, column header, row header, corner - that
//! share one logical pan/zoom viewport:
//! - Affine transform model keeping the panes in sync (headers pinned
//!   while the body scrolls and zooms)
//! - Row/column size harmonization across independently built panes,
//!   including merged cells and width overrides
//! - Sticky-header selection that swaps header content by scroll position
//! - Pointer/gesture state machine with inertial fling and
//!   focal-point-preserving pinch zoom
//!
//! The host owns windowing, drawing and pinch detection; this crate owns
//! the geometry and the state machines.
//!
//! # Usage
//!
//! ```
//! use panegrid::{Cell, GridConfig, PaneGrid, Pane, PaneKind, Row};
//!
//! let mut grid = PaneGrid::new(GridConfig::default());
//! grid.set_frame(800.0, 600.0);
//! let body = Pane::new(vec![Row::new(vec![Cell::new(64.0, 20.0); 5]); 10]);
//! let col_header = Pane::new(vec![Row::new(vec![Cell::new(64.0, 24.0); 5])]);
//! let row_header = Pane::new(vec![Row::new(vec![Cell::new(80.0, 20.0)]); 10]);
//! let corner = Pane::new(vec![Row::new(vec![Cell::new(80.0, 24.0)])]);
//! grid.attach_panes(body, col_header, row_header, corner)?;
//!
//! // Render loop: one transform per pane.
//! let main = grid.transform_for(PaneKind::Main);
//! let (screen_x, screen_y) = main.map(0.0, 0.0);
//! # let _ = (screen_x, screen_y);
//! # Ok::<(), panegrid::GridError>(())
//! ```

pub mod error;
pub mod gesture;
pub mod grid;
pub mod layout;
pub mod sticky;
pub mod types;

pub use error::{GridError, Result};
pub use gesture::{GestureRouter, GestureState, RouterAction};
pub use grid::{GridEvent, PaneGrid};
pub use layout::{AlignmentEngine, AxisTable, ContentBounds, GridLayout, ScrollMetrics, Transform, Viewport};
pub use sticky::{StickySelector, StickySet};
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
