//! Sticky-header selection tests
//!
//! Verifies first-visible search, the predecessor selection rule, and the
//! deep-copy semantics of header rebuilds.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashMap;

use panegrid::sticky::{
    first_visible_index, rebuild_column_header, rebuild_row_header, StickySet,
};
use panegrid::{AlignmentEngine, Cell, CellContent, Pane, Panes, Row};
use test_case::test_case;

// ============================================================================
// Test Helpers
// ============================================================================

fn uniform_pane(rows: usize, cols: usize, w: f32, h: f32) -> Pane {
    Pane::new(
        (0..rows)
            .map(|r| {
                Row::new(
                    (0..cols)
                        .map(|c| Cell::text(w, h, format!("r{r}c{c}")))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Row offsets for 10 rows of 20 px each.
fn row_table() -> panegrid::AxisTable {
    let panes = Panes {
        main: uniform_pane(10, 5, 64.0, 20.0),
        column_header: uniform_pane(1, 5, 64.0, 24.0),
        row_header: uniform_pane(10, 1, 80.0, 20.0),
        corner: uniform_pane(1, 1, 80.0, 24.0),
    };
    AlignmentEngine::default()
        .harmonize(&panes, &HashMap::new())
        .unwrap()
        .main_rows
        .clone()
}

fn cell_text(cell: &Cell) -> &str {
    match &cell.content {
        CellContent::Text { text, .. } => text,
        CellContent::Opaque { .. } => "",
    }
}

// ============================================================================
// SELECTION RULE
// ============================================================================

#[test_case(7, 5 ; "between markers picks predecessor")]
#[test_case(0, 0 ; "at start picks first")]
#[test_case(12, 10 ; "past last picks last")]
#[test_case(5, 5 ; "exactly on marker picks it")]
#[test_case(4, 0 ; "before second marker keeps first")]
fn active_index_for_first_visible(first_visible: usize, expected: usize) {
    let set = StickySet::new(&[0, 5, 10]);
    assert_eq!(set.active_for(first_visible), expected);
}

#[test]
fn no_qualifying_marker_falls_back_to_smallest() {
    let set = StickySet::new(&[6, 9]);
    assert_eq!(set.active_for(3), 6);
}

// ============================================================================
// FIRST VISIBLE
// ============================================================================

#[test]
fn first_visible_tracks_scroll_position() {
    let rows = row_table();
    // Rows are 20 px tall; pan is negative as content scrolls up.
    assert_eq!(first_visible_index(&rows, 0.0, 1.0), 0);
    assert_eq!(first_visible_index(&rows, -19.0, 1.0), 0);
    assert_eq!(first_visible_index(&rows, -20.0, 1.0), 1);
    assert_eq!(first_visible_index(&rows, -110.0, 1.0), 5);
}

#[test]
fn first_visible_divides_out_scale() {
    let rows = row_table();
    // At scale 2, 80 screen px of pan is 40 content px = row 2.
    assert_eq!(first_visible_index(&rows, -80.0, 2.0), 2);
    // At scale 0.5, the same pan is 160 content px = row 8.
    assert_eq!(first_visible_index(&rows, -80.0, 0.5), 8);
}

#[test]
fn first_visible_defaults_for_empty_offsets() {
    let empty = panegrid::AxisTable::default();
    assert_eq!(first_visible_index(&empty, -100.0, 1.0), 0);
}

#[test]
fn first_visible_at_degenerate_scale_is_safe() {
    let rows = row_table();
    assert_eq!(first_visible_index(&rows, 0.0, 0.0), 0);
}

// ============================================================================
// HEADER REBUILD
// ============================================================================

#[test]
fn row_header_copies_active_source_row() {
    let main = uniform_pane(10, 5, 64.0, 20.0);
    let header = rebuild_row_header(&main, 3);
    assert_eq!(header.row_count(), 1);
    assert_eq!(header.rows[0].cells.len(), 5);
    assert_eq!(cell_text(&header.rows[0].cells[0]), "r3c0");
    assert_eq!(cell_text(&header.rows[0].cells[4]), "r3c4");
}

#[test]
fn column_header_copies_from_active_column_onward() {
    let main = uniform_pane(10, 5, 64.0, 20.0);
    let header = rebuild_column_header(&main, 2);
    assert_eq!(header.row_count(), 1);
    assert_eq!(header.rows[0].cells.len(), 3);
    assert_eq!(cell_text(&header.rows[0].cells[0]), "r0c2");
}

#[test]
fn header_copy_preserves_explicit_widths_and_style() {
    let mut main = uniform_pane(2, 3, 64.0, 20.0);
    main.rows[0].explicit_widths = vec![30.0, 40.0, 50.0];
    if let CellContent::Text { style, .. } = &mut main.rows[0].cells[1].content {
        style.size = 22.0;
        style.background = Some(0xFFFF_0000);
    }

    let header = rebuild_column_header(&main, 1);
    assert_eq!(header.rows[0].explicit_widths, vec![40.0, 50.0]);
    match &header.rows[0].cells[0].content {
        CellContent::Text { style, .. } => {
            assert_eq!(style.size, 22.0);
            assert_eq!(style.background, Some(0xFFFF_0000));
        }
        CellContent::Opaque { .. } => panic!("expected text cell"),
    }
}

#[test]
fn mutating_header_copy_leaves_source_intact() {
    let main = uniform_pane(4, 2, 64.0, 20.0);
    let mut header = rebuild_row_header(&main, 2);
    header.rows[0].cells[0].content = CellContent::text("overwritten");
    header.rows[0].cells[1].natural_width = 1.0;

    assert_eq!(cell_text(&main.rows[2].cells[0]), "r2c0");
    assert_eq!(main.rows[2].cells[1].natural_width, 64.0);
}

#[test]
fn opaque_cells_clone_with_their_tag() {
    let mut main = uniform_pane(2, 2, 64.0, 20.0);
    main.rows[1].cells[0] = Cell {
        natural_width: 64.0,
        natural_height: 20.0,
        content: CellContent::Opaque {
            tag: Some("chart-7".to_string()),
        },
    };
    let header = rebuild_row_header(&main, 1);
    match &header.rows[0].cells[0].content {
        CellContent::Opaque { tag } => assert_eq!(tag.as_deref(), Some("chart-7")),
        CellContent::Text { .. } => panic!("expected opaque cell"),
    }
}
