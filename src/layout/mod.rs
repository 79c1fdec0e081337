//! Layout: size harmonization and the shared pan/zoom viewport.
//!
//! [`AlignmentEngine`] turns the four panes' natural cell sizes into shared
//! per-axis tables ([`GridLayout`]); [`Viewport`] owns pan/scale state and
//! the cached per-pane transforms.

mod alignment;
mod viewport;

pub use alignment::{AlignmentEngine, AxisTable, GridLayout};
pub use viewport::{ContentBounds, ScrollMetrics, Transform, Viewport};
