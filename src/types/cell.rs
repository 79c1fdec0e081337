use serde::{Deserialize, Serialize};

/// Visual content carried by a cell.
///
/// The engine never draws; it only needs enough structure to deep-copy cells
/// into header panes. Text cells keep their attributes so the copy renders
/// identically; anything else is an opaque box the host resolves by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellContent {
    /// A text cell with the attributes a header copy must preserve.
    Text { text: String, style: TextStyle },
    /// A non-text cell. `tag` is an opaque host identifier (image id,
    /// widget key, …) copied verbatim into header clones.
    Opaque {
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
}

impl CellContent {
    /// Empty opaque content.
    #[must_use]
    pub fn opaque() -> Self {
        CellContent::Opaque { tag: None }
    }

    /// Text content with default styling.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        CellContent::Text {
            text: text.into(),
            style: TextStyle::default(),
        }
    }
}

/// Text attributes preserved when a cell is copied into a header pane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Text size in logical pixels.
    pub size: f32,
    /// Text color as 0xAARRGGBB.
    pub color: u32,
    /// Padding (left, top, right, bottom) in logical pixels.
    pub padding: [f32; 4],
    /// Background color as 0xAARRGGBB, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<u32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 14.0,
            color: 0xFF00_0000,
            padding: [0.0; 4],
            background: None,
        }
    }
}

/// A single cell with its intrinsic (natural) size.
///
/// Effective sizes after harmonization live in the layout tables, not here;
/// a cell is immutable input to the alignment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Natural (intrinsic) width in logical pixels.
    pub natural_width: f32,
    /// Natural (intrinsic) height in logical pixels.
    pub natural_height: f32,
    /// Visual content, used when cloning into header panes.
    pub content: CellContent,
}

impl Cell {
    /// Create a cell with the given natural size and empty content.
    #[must_use]
    pub fn new(natural_width: f32, natural_height: f32) -> Self {
        Self {
            natural_width,
            natural_height,
            content: CellContent::opaque(),
        }
    }

    /// Create a text cell with the given natural size.
    #[must_use]
    pub fn text(natural_width: f32, natural_height: f32, text: impl Into<String>) -> Self {
        Self {
            natural_width,
            natural_height,
            content: CellContent::text(text),
        }
    }
}

/// A horizontal merge: the cell at `start_column` visually covers
/// `length` column slots of its row. Covered cells after the anchor are
/// absorbed visually but still occupy slots for width accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Column index of the anchor cell.
    pub start_column: usize,
    /// Number of column slots covered, at least 1.
    pub length: usize,
}
