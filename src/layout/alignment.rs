//! Row/column size harmonization across the four panes.
//!
//! Each pane is built independently, so its natural cell sizes disagree
//! with its neighbors. The alignment engine computes one shared width table
//! per column pairing and one shared height table per row pairing, so the
//! panes tile seamlessly:
//!
//! - Main + ColumnHeader share column widths (the scrolling side),
//! - RowHeader + Corner share column widths (the pinned side),
//! - Main + RowHeader share row heights,
//! - ColumnHeader + Corner share row heights.
//!
//! Harmonization runs once per content change, not per frame.

use std::collections::HashMap;

use log::debug;

use crate::error::{GridError, Result};
use crate::layout::ContentBounds;
use crate::types::{Pane, Panes, Row, SpanWidthPolicy};

/// Resolved sizes along one axis plus cumulative offsets.
///
/// `offsets` has one more entry than `sizes`; the final entry is the total
/// extent, so `offsets[i]` is the leading edge of slot `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisTable {
    sizes: Vec<f32>,
    offsets: Vec<f32>,
}

impl AxisTable {
    fn from_sizes(sizes: Vec<f32>) -> Self {
        let mut offsets = Vec::with_capacity(sizes.len() + 1);
        let mut edge = 0.0f32;
        for size in &sizes {
            offsets.push(edge);
            edge += size;
        }
        offsets.push(edge);
        Self { sizes, offsets }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Resolved size of slot `index`, 0 past the end.
    #[must_use]
    pub fn size_of(&self, index: usize) -> f32 {
        self.sizes.get(index).copied().unwrap_or(0.0)
    }

    /// Leading edge of slot `index`, total extent at `len()`.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f32 {
        self.offsets.get(index).copied().unwrap_or_else(|| self.total())
    }

    /// Total extent of the axis.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    /// Greatest slot index whose leading edge is ≤ `pos` (binary search);
    /// 0 when the table is empty or `pos` precedes all offsets.
    #[must_use]
    pub fn index_at(&self, pos: f32) -> usize {
        if self.sizes.is_empty() {
            return 0;
        }
        let slot = match self
            .offsets
            .binary_search_by(|edge| edge.partial_cmp(&pos).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        slot.min(self.sizes.len().saturating_sub(1))
    }

    /// Resolved sizes in slot order.
    #[must_use]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }
}

/// Output of a harmonization pass: the four shared axis tables and the
/// unscaled content bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLayout {
    /// Column widths shared by Main and ColumnHeader.
    pub main_columns: AxisTable,
    /// Column widths shared by RowHeader and Corner.
    pub header_columns: AxisTable,
    /// Row heights shared by Main and RowHeader.
    pub main_rows: AxisTable,
    /// Row heights shared by ColumnHeader and Corner.
    pub header_rows: AxisTable,
    /// Unscaled size of the full grid (both pairings per axis).
    pub content: ContentBounds,
}

impl GridLayout {
    /// Width of the pinned column region (RowHeader / Corner).
    #[must_use]
    pub fn corner_width(&self) -> f32 {
        self.header_columns.total()
    }

    /// Height of the pinned row region (ColumnHeader / Corner).
    #[must_use]
    pub fn corner_height(&self) -> f32 {
        self.header_rows.total()
    }
}

/// Harmonizes the four panes' natural sizes into shared axis tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentEngine {
    policy: SpanWidthPolicy,
}

impl AlignmentEngine {
    /// Engine with the given span accounting policy.
    #[must_use]
    pub fn new(policy: SpanWidthPolicy) -> Self {
        Self { policy }
    }

    /// Reject invalid configuration before any measurement runs: spans
    /// shorter than one slot and negative width overrides.
    ///
    /// # Errors
    /// `InvalidSpan` or `NegativeOverride`; the panes are left untouched.
    pub fn validate(panes: &Panes<Pane>, overrides: &HashMap<usize, f32>) -> Result<()> {
        for pane in [
            &panes.main,
            &panes.column_header,
            &panes.row_header,
            &panes.corner,
        ] {
            for row in &pane.rows {
                for span in &row.spans {
                    if span.length < 1 {
                        return Err(GridError::InvalidSpan {
                            length: span.length,
                        });
                    }
                }
            }
        }
        for (&column, &width) in overrides {
            if width < 0.0 {
                return Err(GridError::NegativeOverride { column, width });
            }
        }
        Ok(())
    }

    /// Write the override map into each row's resolved-width slots.
    ///
    /// A positive override wins; otherwise an already-resolved explicit
    /// width is kept; otherwise the slot stays 0 and measurement falls back
    /// to the cell's natural width.
    pub fn apply_overrides(pane: &mut Pane, overrides: &HashMap<usize, f32>) {
        if overrides.is_empty() {
            return;
        }
        for row in &mut pane.rows {
            let columns = row.cells.len();
            let mut resolved = vec![0.0f32; columns];
            for (column, slot) in resolved.iter_mut().enumerate() {
                let override_width = overrides.get(&column).copied().unwrap_or(0.0);
                if override_width > 0.0 {
                    *slot = override_width;
                } else {
                    *slot = row.explicit_widths.get(column).copied().unwrap_or(0.0);
                }
            }
            row.explicit_widths = resolved;
        }
    }

    /// Run the full harmonization pass and produce the shared tables.
    ///
    /// Pure over its inputs: running twice on unchanged panes produces
    /// identical tables.
    ///
    /// # Errors
    /// Configuration errors from [`AlignmentEngine::validate`].
    pub fn harmonize(
        &self,
        panes: &Panes<Pane>,
        overrides: &HashMap<usize, f32>,
    ) -> Result<GridLayout> {
        Self::validate(panes, overrides)?;

        // Column widths, element-wise max across each pairing.
        let mut main_widths = Vec::new();
        self.merge_column_widths(&mut main_widths, &panes.main);
        self.merge_column_widths(&mut main_widths, &panes.column_header);

        let mut header_widths = Vec::new();
        self.merge_column_widths(&mut header_widths, &panes.row_header);
        self.merge_column_widths(&mut header_widths, &panes.corner);

        // Row heights, element-wise max across each pairing.
        let mut main_heights = Vec::new();
        merge_row_heights(&mut main_heights, &panes.main);
        merge_row_heights(&mut main_heights, &panes.row_header);

        let mut header_heights = Vec::new();
        merge_row_heights(&mut header_heights, &panes.column_header);
        merge_row_heights(&mut header_heights, &panes.corner);

        let main_columns = AxisTable::from_sizes(main_widths);
        let header_columns = AxisTable::from_sizes(header_widths);
        let main_rows = AxisTable::from_sizes(main_heights);
        let header_rows = AxisTable::from_sizes(header_heights);

        let content = ContentBounds {
            width: header_columns.total() + main_columns.total(),
            height: header_rows.total() + main_rows.total(),
        };
        debug!(
            "harmonize: {}x{} scroll slots, {}x{} pinned slots, content {}x{}",
            main_columns.len(),
            main_rows.len(),
            header_columns.len(),
            header_rows.len(),
            content.width,
            content.height
        );

        Ok(GridLayout {
            main_columns,
            header_columns,
            main_rows,
            header_rows,
            content,
        })
    }

    fn merge_column_widths(&self, widths: &mut Vec<f32>, pane: &Pane) {
        for row in &pane.rows {
            for column in 0..row.cells.len() {
                let width = self.slot_width(row, column);
                if widths.len() <= column {
                    widths.push(width);
                } else if let Some(slot) = widths.get_mut(column) {
                    *slot = slot.max(width);
                }
            }
        }
    }

    /// Natural width a row contributes for one column slot.
    ///
    /// An explicit (override-resolved) width wins outright. Otherwise the
    /// cell's own natural width applies, widened by the span policy when a
    /// merge covers the slot. A cell that anchors a multi-slot span is
    /// accounted through the policy alone, so apportioning actually divides
    /// its width instead of re-claiming the full amount for its own slot.
    fn slot_width(&self, row: &Row, column: usize) -> f32 {
        let explicit = row.explicit_widths.get(column).copied().unwrap_or(0.0);
        if explicit > 0.0 {
            return explicit;
        }
        let anchors_multi_slot = row
            .spans
            .iter()
            .any(|s| s.start_column == column && s.length > 1);
        let own = if anchors_multi_slot {
            0.0
        } else {
            row.cells
                .get(column)
                .map_or(0.0, |cell| cell.natural_width.max(0.0))
        };
        let span_width = row
            .spans
            .iter()
            .filter(|s| column >= s.start_column && column < s.start_column + s.length.max(1))
            .map(|s| {
                let anchor = row
                    .cells
                    .get(s.start_column)
                    .map_or(0.0, |cell| cell.natural_width.max(0.0));
                match self.policy {
                    SpanWidthPolicy::DuplicateAnchor => anchor,
                    SpanWidthPolicy::ApportionEven => anchor / s.length.max(1) as f32,
                }
            })
            .fold(0.0f32, f32::max);
        own.max(span_width)
    }
}

/// Natural height a pane contributes per row: the tallest cell of the row.
fn merge_row_heights(heights: &mut Vec<f32>, pane: &Pane) {
    for (index, row) in pane.rows.iter().enumerate() {
        let height = row
            .cells
            .iter()
            .map(|cell| cell.natural_height.max(0.0))
            .fold(0.0f32, f32::max);
        if heights.len() <= index {
            heights.push(height);
        } else if let Some(slot) = heights.get_mut(index) {
            *slot = slot.max(height);
        }
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
    use crate::types::Cell;

    fn uniform_pane(rows: usize, cols: usize, w: f32, h: f32) -> Pane {
        Pane::new(
            (0..rows)
                .map(|_| Row::new(vec![Cell::new(w, h); cols]))
                .collect(),
        )
    }

    fn four_panes() -> Panes<Pane> {
        Panes {
            main: uniform_pane(10, 5, 64.0, 20.0),
            column_header: uniform_pane(1, 5, 40.0, 24.0),
            row_header: uniform_pane(10, 1, 80.0, 18.0),
            corner: uniform_pane(1, 1, 50.0, 30.0),
        }
    }

    #[test]
    fn widths_are_pairwise_maxima() {
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&four_panes(), &HashMap::new()).unwrap();

        // Main (64) vs column header (40): 64 wins for every shared column.
        assert_eq!(layout.main_columns.sizes(), &[64.0; 5]);
        // Row header (80) vs corner (50): 80 wins.
        assert_eq!(layout.header_columns.sizes(), &[80.0]);
    }

    #[test]
    fn heights_are_pairwise_maxima() {
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&four_panes(), &HashMap::new()).unwrap();

        // Main rows (20) vs row header rows (18).
        assert_eq!(layout.main_rows.sizes(), &[20.0; 10]);
        // Column header row (24) vs corner row (30).
        assert_eq!(layout.header_rows.sizes(), &[30.0]);
    }

    #[test]
    fn missing_index_counts_as_zero() {
        let mut panes = four_panes();
        // Column header has only 3 columns; main still has 5.
        panes.column_header = uniform_pane(1, 3, 100.0, 24.0);
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&panes, &HashMap::new()).unwrap();
        assert_eq!(layout.main_columns.sizes(), &[100.0, 100.0, 100.0, 64.0, 64.0]);
    }

    #[test]
    fn override_replaces_computed_maximum() {
        let mut panes = four_panes();
        let mut overrides = HashMap::new();
        overrides.insert(2usize, 30.0f32);
        AlignmentEngine::apply_overrides(&mut panes.main, &overrides);
        AlignmentEngine::apply_overrides(&mut panes.column_header, &overrides);

        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&panes, &overrides).unwrap();
        assert_eq!(layout.main_columns.size_of(2), 30.0);
        assert_eq!(layout.main_columns.size_of(1), 64.0);
    }

    #[test]
    fn zero_override_is_ignored() {
        let mut panes = four_panes();
        let mut overrides = HashMap::new();
        overrides.insert(1usize, 0.0f32);
        AlignmentEngine::apply_overrides(&mut panes.main, &overrides);
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&panes, &overrides).unwrap();
        assert_eq!(layout.main_columns.size_of(1), 64.0);
    }

    #[test]
    fn negative_override_is_rejected() {
        let panes = four_panes();
        let mut overrides = HashMap::new();
        overrides.insert(3usize, -10.0f32);
        let engine = AlignmentEngine::default();
        assert!(matches!(
            engine.harmonize(&panes, &overrides),
            Err(GridError::NegativeOverride { column: 3, .. })
        ));
    }

    #[test]
    fn duplicate_anchor_span_fills_every_slot() {
        let mut panes = four_panes();
        let mut row = Row::new(vec![
            Cell::new(120.0, 20.0),
            Cell::new(10.0, 20.0),
            Cell::new(10.0, 20.0),
            Cell::new(64.0, 20.0),
            Cell::new(64.0, 20.0),
        ]);
        row.merge_cells(0, 3).unwrap();
        panes.main.rows[0] = row;

        let engine = AlignmentEngine::new(SpanWidthPolicy::DuplicateAnchor);
        let layout = engine.harmonize(&panes, &HashMap::new()).unwrap();
        // The anchor's 120 is recorded into all three covered slots.
        assert_eq!(layout.main_columns.size_of(0), 120.0);
        assert_eq!(layout.main_columns.size_of(1), 120.0);
        assert_eq!(layout.main_columns.size_of(2), 120.0);
        assert_eq!(layout.main_columns.size_of(3), 64.0);
    }

    #[test]
    fn apportioned_span_divides_anchor_width() {
        let mut panes = four_panes();
        let mut row = Row::new(vec![
            Cell::new(120.0, 20.0),
            Cell::new(10.0, 20.0),
            Cell::new(10.0, 20.0),
            Cell::new(64.0, 20.0),
            Cell::new(64.0, 20.0),
        ]);
        row.merge_cells(0, 3).unwrap();
        panes.main.rows[0] = row;
        // Remove competing widths from the other main rows.
        for r in panes.main.rows.iter_mut().skip(1) {
            for c in &mut r.cells {
                c.natural_width = 10.0;
            }
        }
        panes.column_header = uniform_pane(1, 5, 10.0, 24.0);

        let engine = AlignmentEngine::new(SpanWidthPolicy::ApportionEven);
        let layout = engine.harmonize(&panes, &HashMap::new()).unwrap();
        // 120 / 3 = 40 per covered slot.
        assert_eq!(layout.main_columns.size_of(0), 40.0);
        assert_eq!(layout.main_columns.size_of(1), 40.0);
        assert_eq!(layout.main_columns.size_of(2), 40.0);
    }

    #[test]
    fn covered_cell_still_occupies_its_slot() {
        let mut panes = four_panes();
        let mut row = Row::new(vec![
            Cell::new(20.0, 20.0),
            Cell::new(90.0, 20.0), // wider than the duplicated anchor
            Cell::new(10.0, 20.0),
            Cell::new(64.0, 20.0),
            Cell::new(64.0, 20.0),
        ]);
        row.merge_cells(0, 3).unwrap();
        panes.main.rows[0] = row;

        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&panes, &HashMap::new()).unwrap();
        assert_eq!(layout.main_columns.size_of(1), 90.0);
    }

    #[test]
    fn harmonization_is_idempotent() {
        let panes = four_panes();
        let overrides = HashMap::from([(1usize, 77.0f32)]);
        let engine = AlignmentEngine::default();
        let first = engine.harmonize(&panes, &overrides).unwrap();
        let second = engine.harmonize(&panes, &overrides).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn content_bounds_sum_both_pairings() {
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&four_panes(), &HashMap::new()).unwrap();
        // 80 (pinned column) + 5 * 64 (scroll columns).
        assert_eq!(layout.content.width, 80.0 + 320.0);
        // 30 (pinned row) + 10 * 20 (scroll rows).
        assert_eq!(layout.content.height, 30.0 + 200.0);
        assert_eq!(layout.corner_width(), 80.0);
        assert_eq!(layout.corner_height(), 30.0);
    }

    #[test]
    fn offsets_are_cumulative_with_final_edge() {
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&four_panes(), &HashMap::new()).unwrap();
        assert_eq!(layout.main_columns.offset_of(0), 0.0);
        assert_eq!(layout.main_columns.offset_of(1), 64.0);
        assert_eq!(layout.main_columns.offset_of(5), 320.0);
        assert_eq!(layout.main_columns.total(), 320.0);
    }

    #[test]
    fn index_at_finds_greatest_leading_edge() {
        let engine = AlignmentEngine::default();
        let layout = engine.harmonize(&four_panes(), &HashMap::new()).unwrap();
        assert_eq!(layout.main_rows.index_at(0.0), 0);
        assert_eq!(layout.main_rows.index_at(19.9), 0);
        assert_eq!(layout.main_rows.index_at(20.0), 1);
        assert_eq!(layout.main_rows.index_at(51.0), 2);
        assert_eq!(layout.main_rows.index_at(1e9), 9);
        assert_eq!(layout.main_rows.index_at(-5.0), 0);
    }

    #[test]
    fn empty_panes_produce_empty_layout() {
        let engine = AlignmentEngine::default();
        let layout = engine
            .harmonize(&Panes::default(), &HashMap::new())
            .unwrap();
        assert!(layout.main_columns.is_empty());
        assert_eq!(layout.content.width, 0.0);
        assert_eq!(layout.main_rows.index_at(10.0), 0);
    }
}
