//! Sticky-header selection and header pane rebuilds.
//!
//! The host marks rows and columns as sticky-eligible. As the main pane
//! scrolls, the greatest eligible index at or before the first visible
//! row/column becomes "active", and the matching header pane is rebuilt
//! with an independent deep copy of the source cells. Rebuilds happen at
//! most once per index change, never per frame.

use log::debug;

use crate::layout::AxisTable;
use crate::types::{Pane, Row};

/// Ascending, deduplicated sticky-eligible indices. Never empty: an empty
/// host set collapses to `[0]` so index 0 is pinned by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickySet {
    indices: Vec<usize>,
}

impl Default for StickySet {
    fn default() -> Self {
        Self { indices: vec![0] }
    }
}

impl StickySet {
    /// Build from host-provided indices; sorts, dedups, defaults to `[0]`.
    #[must_use]
    pub fn new(indices: &[usize]) -> Self {
        if indices.is_empty() {
            return Self::default();
        }
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    /// The sorted indices.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Greatest entry ≤ `first_visible`, else the smallest entry: the last
    /// eligible marker not yet scrolled past (predecessor in a sorted set).
    #[must_use]
    pub fn active_for(&self, first_visible: usize) -> usize {
        match self.indices.binary_search(&first_visible) {
            Ok(i) => self.indices.get(i).copied().unwrap_or(0),
            Err(0) => self.indices.first().copied().unwrap_or(0),
            Err(i) => self.indices.get(i - 1).copied().unwrap_or(0),
        }
    }
}

/// First slot whose leading edge is at or before the visible content
/// origin `-pan / scale`. 0 for an empty table or an origin before all
/// offsets.
#[must_use]
pub fn first_visible_index(offsets: &AxisTable, pan: f32, scale: f32) -> usize {
    let origin = if scale.abs() > f32::EPSILON {
        -pan / scale
    } else {
        -pan
    };
    offsets.index_at(origin)
}

/// Which header panes changed during a viewport update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyChange {
    pub row_changed: bool,
    pub column_changed: bool,
}

/// Tracks the active sticky row/column and detects changes.
#[derive(Debug, Clone, Default)]
pub struct StickySelector {
    rows: StickySet,
    columns: StickySet,
    active_row: usize,
    active_column: usize,
}

impl StickySelector {
    pub fn active_row(&self) -> usize {
        self.active_row
    }

    pub fn active_column(&self) -> usize {
        self.active_column
    }

    pub fn row_set(&self) -> &StickySet {
        &self.rows
    }

    pub fn column_set(&self) -> &StickySet {
        &self.columns
    }

    /// Replace the sticky row set. Returns true when the active row moved
    /// as a result (the caller should rebuild the row header).
    pub fn set_row_indices(&mut self, indices: &[usize], first_visible: usize) -> bool {
        self.rows = StickySet::new(indices);
        self.select(first_visible, self.active_column).row_changed
    }

    /// Replace the sticky column set. Returns true when the active column
    /// moved.
    pub fn set_column_indices(&mut self, indices: &[usize], first_visible: usize) -> bool {
        self.columns = StickySet::new(indices);
        self.select(self.active_row, first_visible).column_changed
    }

    /// Recompute both active indices from the first visible row/column.
    pub fn select(&mut self, first_visible_row: usize, first_visible_column: usize) -> StickyChange {
        let row = self.rows.active_for(first_visible_row);
        let column = self.columns.active_for(first_visible_column);
        let change = StickyChange {
            row_changed: row != self.active_row,
            column_changed: column != self.active_column,
        };
        if change.row_changed {
            debug!("active sticky row {} -> {row}", self.active_row);
            self.active_row = row;
        }
        if change.column_changed {
            debug!("active sticky column {} -> {column}", self.active_column);
            self.active_column = column;
        }
        change
    }
}

/// Rebuild the row header pane: an independent deep copy of the active
/// sticky row of the main pane. Returns an empty pane when the index is out
/// of range.
#[must_use]
pub fn rebuild_row_header(main: &Pane, active_row: usize) -> Pane {
    match main.rows.get(active_row) {
        Some(row) => Pane::new(vec![row.deep_copy()]),
        None => Pane::default(),
    }
}

/// Rebuild the column header pane: the main pane's first row from the
/// active sticky column onward, deep-copied with its explicit widths.
#[must_use]
pub fn rebuild_column_header(main: &Pane, active_column: usize) -> Pane {
    let Some(source) = main.rows.first() else {
        return Pane::default();
    };
    let cells = source
        .cells
        .iter()
        .skip(active_column)
        .cloned()
        .collect::<Vec<_>>();
    let explicit_widths = source
        .explicit_widths
        .iter()
        .skip(active_column)
        .copied()
        .collect::<Vec<_>>();
    let mut row = Row::new(cells);
    row.explicit_widths = explicit_widths;
    Pane::new(vec![row])
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
    use crate::types::{Cell, CellContent};

    #[test]
    fn sticky_set_sorts_and_dedups() {
        let set = StickySet::new(&[10, 0, 5, 5]);
        assert_eq!(set.indices(), &[0, 5, 10]);
    }

    #[test]
    fn empty_set_defaults_to_zero() {
        let set = StickySet::new(&[]);
        assert_eq!(set.indices(), &[0]);
        assert_eq!(set.active_for(100), 0);
    }

    #[test]
    fn active_is_predecessor_or_smallest() {
        let set = StickySet::new(&[0, 5, 10]);
        assert_eq!(set.active_for(7), 5);
        assert_eq!(set.active_for(0), 0);
        assert_eq!(set.active_for(12), 10);
        assert_eq!(set.active_for(5), 5);

        // No entry ≤ first visible: fall back to the smallest.
        let late = StickySet::new(&[4, 8]);
        assert_eq!(late.active_for(2), 4);
    }

    #[test]
    fn selector_reports_changes_once() {
        let mut selector = StickySelector::default();
        selector.set_row_indices(&[0, 3], 0);

        let change = selector.select(5, 0);
        assert!(change.row_changed);
        assert_eq!(selector.active_row(), 3);

        // Same first-visible again: no change, no rebuild.
        let change = selector.select(5, 0);
        assert!(!change.row_changed);
    }

    #[test]
    fn row_header_rebuild_is_deep() {
        let main = Pane::new(vec![
            Row::new(vec![Cell::text(64.0, 20.0, "r0")]),
            Row::new(vec![Cell::text(64.0, 20.0, "r1")]),
        ]);
        let mut header = rebuild_row_header(&main, 1);
        match &header.rows[0].cells[0].content {
            CellContent::Text { text, .. } => assert_eq!(text, "r1"),
            CellContent::Opaque { .. } => panic!("expected text cell"),
        }

        // Mutating the copy must not touch the source.
        header.rows[0].cells[0].content = CellContent::text("mutated");
        match &main.rows[1].cells[0].content {
            CellContent::Text { text, .. } => assert_eq!(text, "r1"),
            CellContent::Opaque { .. } => panic!("expected text cell"),
        }
    }

    #[test]
    fn column_header_rebuild_slices_from_active_column() {
        let mut row = Row::new(vec![
            Cell::text(10.0, 20.0, "c0"),
            Cell::text(20.0, 20.0, "c1"),
            Cell::text(30.0, 20.0, "c2"),
        ]);
        row.explicit_widths = vec![10.0, 20.0, 30.0];
        let main = Pane::new(vec![row]);

        let header = rebuild_column_header(&main, 1);
        assert_eq!(header.rows[0].cells.len(), 2);
        assert_eq!(header.rows[0].explicit_widths, vec![20.0, 30.0]);
        match &header.rows[0].cells[0].content {
            CellContent::Text { text, .. } => assert_eq!(text, "c1"),
            CellContent::Opaque { .. } => panic!("expected text cell"),
        }
    }

    #[test]
    fn rebuild_out_of_range_is_empty() {
        let main = Pane::default();
        assert_eq!(rebuild_row_header(&main, 3).row_count(), 0);
        assert_eq!(rebuild_column_header(&main, 0).row_count(), 0);
    }
}
