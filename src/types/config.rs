use serde::{Deserialize, Serialize};

/// How a span's width is recorded into the column slots it covers.
///
/// `DuplicateAnchor` reproduces the reference behavior: the anchor cell's
/// full natural width lands in every covered slot, so the harmonizer never
/// under-allocates but the total row width overcounts when merges are in
/// play. `ApportionEven` divides the anchor width across the slots for
/// hosts that want exact totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpanWidthPolicy {
    #[default]
    DuplicateAnchor,
    ApportionEven,
}

/// Tuning knobs for inertial scrolling after pointer release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlingConfig {
    /// Release speed (logical px/s) below which no fling starts.
    pub min_velocity: f32,
    /// Per-tick velocity decay factor (0.0 = instant stop, 1.0 = no
    /// friction). Typical: 0.90–0.96 at 60 ticks/s.
    pub friction: f32,
    /// Speed (logical px/s) below which a running fling snaps to zero.
    pub stop_threshold: f32,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            min_velocity: 50.0,
            friction: 0.95,
            stop_threshold: 10.0,
        }
    }
}

/// Configuration surface of the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Lower zoom bound.
    pub min_scale: f32,
    /// Upper zoom bound.
    pub max_scale: f32,
    /// Distance (logical px) a pointer must travel from its first touch
    /// before a drag starts.
    pub touch_slop: f32,
    /// Inertial scroll tuning.
    pub fling: FlingConfig,
    /// Span slot accounting policy for the alignment engine.
    pub span_width_policy: SpanWidthPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
            touch_slop: 8.0,
            fling: FlingConfig::default(),
            span_width_policy: SpanWidthPolicy::default(),
        }
    }
}
