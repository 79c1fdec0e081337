//! Structured error types for panegrid.
//!
//! Configuration mistakes surface here at setup time; runtime geometry is
//! total and never errors (see the crate docs).

/// All errors that can occur while configuring a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A cell span must cover at least one column.
    #[error("Invalid span: length {length} (must be 1 or greater)")]
    InvalidSpan {
        /// The rejected span length.
        length: usize,
    },

    /// Column width overrides must be positive to take effect; negative
    /// values are rejected rather than silently ignored.
    #[error("Negative width override {width} for column {column}")]
    NegativeOverride {
        /// Column index the override targeted.
        column: usize,
        /// The rejected width.
        width: f32,
    },

    /// API misuse that would corrupt the four-pane structure.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;
