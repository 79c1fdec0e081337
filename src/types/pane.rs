use serde::{Deserialize, Serialize};

use super::{Cell, Span};
use crate::error::{GridError, Result};

/// Identity of one of the four coordinated panes.
///
/// Corner is fixed at the origin, ColumnHeader pans only in x, RowHeader
/// only in y, Main in both; all four share the same scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaneKind {
    Main,
    ColumnHeader,
    RowHeader,
    Corner,
}

/// Fixed four-slot holder addressed by [`PaneKind`].
///
/// The panes form a bounded, fixed-cardinality relationship, so this is a
/// plain struct of named slots rather than any kind of tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panes<T> {
    pub main: T,
    pub column_header: T,
    pub row_header: T,
    pub corner: T,
}

impl<T> Panes<T> {
    /// Borrow the slot for `kind`.
    pub fn get(&self, kind: PaneKind) -> &T {
        match kind {
            PaneKind::Main => &self.main,
            PaneKind::ColumnHeader => &self.column_header,
            PaneKind::RowHeader => &self.row_header,
            PaneKind::Corner => &self.corner,
        }
    }

    /// Mutably borrow the slot for `kind`.
    pub fn get_mut(&mut self, kind: PaneKind) -> &mut T {
        match kind {
            PaneKind::Main => &mut self.main,
            PaneKind::ColumnHeader => &mut self.column_header,
            PaneKind::RowHeader => &mut self.row_header,
            PaneKind::Corner => &mut self.corner,
        }
    }
}

/// One horizontal row of cells inside a pane.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    /// Cells in column order. Cells covered by a span still occupy a slot.
    pub cells: Vec<Cell>,
    /// Horizontal merges anchored in this row.
    pub spans: Vec<Span>,
    /// Resolved per-column widths written by the override pass; entries of
    /// 0 mean "no explicit width". Copied verbatim into header clones.
    pub explicit_widths: Vec<f32>,
}

impl Row {
    /// Row from a list of cells, no merges.
    #[must_use]
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            spans: Vec::new(),
            explicit_widths: Vec::new(),
        }
    }

    /// Register a horizontal merge of `length` slots anchored at
    /// `start_column`.
    ///
    /// # Errors
    /// `InvalidSpan` if `length` is zero; spans are validated here, at
    /// configuration time, never during measurement.
    pub fn merge_cells(&mut self, start_column: usize, length: usize) -> Result<()> {
        if length < 1 {
            return Err(GridError::InvalidSpan { length });
        }
        self.spans.push(Span {
            start_column,
            length,
        });
        Ok(())
    }

    /// Span length anchored at `column`, 1 when no merge starts there.
    #[must_use]
    pub fn span_at(&self, column: usize) -> usize {
        self.spans
            .iter()
            .find(|s| s.start_column == column)
            .map_or(1, |s| s.length.max(1))
    }

    /// Deep copy: independent cells with the same content, sizes and
    /// explicit widths. Mutating the copy never touches the source.
    #[must_use]
    pub fn deep_copy(&self) -> Row {
        self.clone()
    }
}

/// Content of one pane: ordered rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pane {
    pub rows: Vec<Row>,
}

impl Pane {
    /// Pane from ordered rows.
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Widest row length, in column slots.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
