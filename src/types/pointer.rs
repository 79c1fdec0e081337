use serde::{Deserialize, Serialize};

/// Phase of a normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A raw pointer event as delivered by the host.
///
/// Coordinates are in the grid's screen space (the frame the panes are
/// drawn into), before any pane transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    /// Host pointer id, stable for the lifetime of the touch.
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
    /// Host timestamp in milliseconds; used for velocity estimation.
    pub timestamp_ms: f64,
}

impl PointerEvent {
    /// Shorthand constructor.
    #[must_use]
    pub fn new(id: u32, x: f32, y: f32, phase: PointerPhase, timestamp_ms: f64) -> Self {
        Self {
            id,
            x,
            y,
            phase,
            timestamp_ms,
        }
    }
}
