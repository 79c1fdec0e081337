//! Viewport state management for panning and zoom.
//!
//! One [`Viewport`] is shared by all four panes: they see the same scale,
//! and each pane picks up the pan components it owns (Main both, column
//! header x only, row header y only, corner none). Pane transforms are
//! cached behind a version counter and recomputed only when the viewport or
//! the content bounds change.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{PaneKind, Panes};

/// Scale below which a transform is treated as degenerate and inversion
/// falls back to a pure translation.
const MIN_INVERTIBLE_SCALE: f32 = 1e-6;

/// Affine map from pane content space to screen space: uniform scale plus
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub scale: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    /// The identity map.
    pub const IDENTITY: Transform = Transform {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Map a content-space point to screen space.
    #[must_use]
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.tx, y * self.scale + self.ty)
    }

    /// Map a screen-space point back to content space.
    ///
    /// Total: a degenerate scale falls back to translation only, so the
    /// result is always finite.
    #[must_use]
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        if self.scale.abs() < MIN_INVERTIBLE_SCALE {
            return (x - self.tx, y - self.ty);
        }
        ((x - self.tx) / self.scale, (y - self.ty) / self.scale)
    }

    /// The inverse map, with the same degenerate-scale fallback as
    /// [`Transform::unmap`].
    #[must_use]
    pub fn invert(&self) -> Transform {
        if self.scale.abs() < MIN_INVERTIBLE_SCALE {
            return Transform {
                scale: 1.0,
                tx: -self.tx,
                ty: -self.ty,
            };
        }
        Transform {
            scale: 1.0 / self.scale,
            tx: -self.tx / self.scale,
            ty: -self.ty / self.scale,
        }
    }
}

/// Unscaled size of the full grid content (all four pane extents).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBounds {
    pub width: f32,
    pub height: f32,
}

/// The shared pan/zoom state and the four cached pane transforms.
///
/// Pan is kept in the `[min(0, frame − content·scale), 0]` range on every
/// mutation, so content edges never drift past the visible frame; when
/// content is smaller than the frame the range collapses and content pins
/// to the top-left. All mutators are total — out-of-range input is clamped,
/// degenerate input is ignored.
#[derive(Debug, Clone)]
pub struct Viewport {
    pan_x: f32,
    pan_y: f32,
    scale: f32,
    min_scale: f32,
    max_scale: f32,
    frame_width: f32,
    frame_height: f32,
    content: ContentBounds,
    /// Bumped on every state change; hosts can use it to detect staleness.
    version: u64,
    transforms: Panes<Transform>,
    transforms_version: u64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.5, 2.0)
    }
}

impl Viewport {
    /// Create a viewport at pan 0 / scale 1 with the given zoom bounds.
    #[must_use]
    pub fn new(min_scale: f32, max_scale: f32) -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0,
            min_scale,
            max_scale,
            frame_width: 0.0,
            frame_height: 0.0,
            content: ContentBounds::default(),
            version: 0,
            transforms: Panes {
                main: Transform::IDENTITY,
                column_header: Transform::IDENTITY,
                row_header: Transform::IDENTITY,
                corner: Transform::IDENTITY,
            },
            // Force a rebuild on first access.
            transforms_version: u64::MAX,
        }
    }

    pub fn pan_x(&self) -> f32 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f32 {
        self.pan_y
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn min_scale(&self) -> f32 {
        self.min_scale
    }

    pub fn max_scale(&self) -> f32 {
        self.max_scale
    }

    pub fn content_bounds(&self) -> ContentBounds {
        self.content
    }

    pub fn frame_size(&self) -> (f32, f32) {
        (self.frame_width, self.frame_height)
    }

    /// Monotonic change counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_min_scale(&mut self, min_scale: f32) {
        self.min_scale = min_scale;
        self.apply(self.pan_x, self.pan_y, self.scale);
    }

    pub fn set_max_scale(&mut self, max_scale: f32) {
        self.max_scale = max_scale;
        self.apply(self.pan_x, self.pan_y, self.scale);
    }

    /// Set the visible frame size; pan is re-clamped against it.
    pub fn set_frame(&mut self, width: f32, height: f32) {
        self.frame_width = width.max(0.0);
        self.frame_height = height.max(0.0);
        self.apply(self.pan_x, self.pan_y, self.scale);
    }

    /// Replace the content bounds (after a harmonization pass); pan is
    /// re-clamped against the new extent.
    pub fn set_content_bounds(&mut self, content: ContentBounds) {
        self.content = ContentBounds {
            width: content.width.max(0.0),
            height: content.height.max(0.0),
        };
        self.apply(self.pan_x, self.pan_y, self.scale);
    }

    /// Set pan and scale together. Scale clamps to `[min_scale,
    /// max_scale]`; pan clamps so content edges stay within the frame.
    /// Non-finite values leave the previous state in place.
    pub fn set_viewport(&mut self, pan_x: f32, pan_y: f32, scale: f32) {
        let scale = if scale.is_finite() { scale } else { self.scale };
        let pan_x = if pan_x.is_finite() { pan_x } else { self.pan_x };
        let pan_y = if pan_y.is_finite() { pan_y } else { self.pan_y };
        self.apply(pan_x, pan_y, scale);
    }

    /// Pan by a screen-space delta at the current scale.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.set_viewport(self.pan_x + dx, self.pan_y + dy, self.scale);
    }

    /// Multiply the current scale by `factor`, keeping the content point
    /// under `(focal_x, focal_y)` visually stationary.
    ///
    /// The focal point is mapped to content space through the inverse of
    /// the pre-zoom Main transform; the pan is then rebuilt so the same
    /// content point lands back on the focal coordinate at the new scale,
    /// before the usual clamps. Degenerate factors (non-finite or ≤ 0) are
    /// ignored.
    pub fn zoom_at(&mut self, focal_x: f32, focal_y: f32, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let (content_x, content_y) = self.main_transform().unmap(focal_x, focal_y);
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        let pan_x = focal_x - content_x * new_scale;
        let pan_y = focal_y - content_y * new_scale;
        debug!(
            "zoom_at focal=({focal_x},{focal_y}) factor={factor} -> scale={new_scale} pan=({pan_x},{pan_y})"
        );
        self.apply(pan_x, pan_y, new_scale);
    }

    fn apply(&mut self, pan_x: f32, pan_y: f32, scale: f32) {
        let scale = scale.clamp(self.min_scale, self.max_scale);
        let min_pan_x = (self.frame_width - self.content.width * scale).min(0.0);
        let min_pan_y = (self.frame_height - self.content.height * scale).min(0.0);
        let pan_x = pan_x.clamp(min_pan_x, 0.0);
        let pan_y = pan_y.clamp(min_pan_y, 0.0);

        let changed = (pan_x - self.pan_x).abs() > f32::EPSILON
            || (pan_y - self.pan_y).abs() > f32::EPSILON
            || (scale - self.scale).abs() > f32::EPSILON;
        if changed {
            self.pan_x = pan_x;
            self.pan_y = pan_y;
            self.scale = scale;
            self.version = self.version.wrapping_add(1);
        }
    }

    /// The Main pane transform without touching the cache (used internally
    /// where `&mut` borrows overlap).
    fn main_transform(&self) -> Transform {
        Transform {
            scale: self.scale,
            tx: self.pan_x,
            ty: self.pan_y,
        }
    }

    /// All four pane transforms, rebuilt only when the viewport changed
    /// since the last call.
    pub fn transforms(&mut self) -> &Panes<Transform> {
        if self.transforms_version != self.version {
            let scale = self.scale;
            self.transforms = Panes {
                main: Transform {
                    scale,
                    tx: self.pan_x,
                    ty: self.pan_y,
                },
                column_header: Transform {
                    scale,
                    tx: self.pan_x,
                    ty: 0.0,
                },
                row_header: Transform {
                    scale,
                    tx: 0.0,
                    ty: self.pan_y,
                },
                corner: Transform {
                    scale,
                    tx: 0.0,
                    ty: 0.0,
                },
            };
            self.transforms_version = self.version;
        }
        &self.transforms
    }

    /// The affine map `(content) → (screen)` for one pane.
    pub fn transform_for(&mut self, pane: PaneKind) -> Transform {
        *self.transforms().get(pane)
    }

    /// Content-space coordinate of the visible origin, `-pan / scale`.
    /// Safe at degenerate scale (falls back to `-pan`).
    #[must_use]
    pub fn visible_origin(&self) -> (f32, f32) {
        if self.scale.abs() < MIN_INVERTIBLE_SCALE {
            return (-self.pan_x, -self.pan_y);
        }
        (-self.pan_x / self.scale, -self.pan_y / self.scale)
    }

    /// Scrollable range and offset for one axis, `(extent·scale, -pan)`,
    /// suitable for driving a scrollbar indicator.
    #[must_use]
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            horizontal_range: self.content.width * self.scale,
            horizontal_offset: -self.pan_x,
            vertical_range: self.content.height * self.scale,
            vertical_offset: -self.pan_y,
        }
    }
}

/// Scrollbar-facing ranges and offsets for both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    pub horizontal_range: f32,
    pub horizontal_offset: f32,
    pub vertical_range: f32,
    pub vertical_offset: f32,
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

    fn viewport_800x600() -> Viewport {
        let mut vp = Viewport::new(0.5, 2.0);
        vp.set_frame(800.0, 600.0);
        vp.set_content_bounds(ContentBounds {
            width: 2000.0,
            height: 1500.0,
        });
        vp
    }

    #[test]
    fn pan_clamps_to_content_edges() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-5000.0, -5000.0, 1.0);
        assert_eq!(vp.pan_x(), 800.0 - 2000.0);
        assert_eq!(vp.pan_y(), 600.0 - 1500.0);

        vp.set_viewport(100.0, 100.0, 1.0);
        assert_eq!(vp.pan_x(), 0.0);
        assert_eq!(vp.pan_y(), 0.0);
    }

    #[test]
    fn scale_clamps_to_bounds() {
        let mut vp = viewport_800x600();
        vp.set_viewport(0.0, 0.0, 10.0);
        assert_eq!(vp.scale(), 2.0);
        vp.set_viewport(0.0, 0.0, 0.01);
        assert_eq!(vp.scale(), 0.5);
    }

    #[test]
    fn small_content_pins_to_origin() {
        let mut vp = Viewport::new(0.5, 2.0);
        vp.set_frame(800.0, 600.0);
        vp.set_content_bounds(ContentBounds {
            width: 100.0,
            height: 50.0,
        });
        vp.set_viewport(-300.0, -300.0, 1.0);
        assert_eq!(vp.pan_x(), 0.0);
        assert_eq!(vp.pan_y(), 0.0);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-100.0, -50.0, 1.0);
        vp.set_viewport(f32::NAN, f32::INFINITY, f32::NAN);
        assert_eq!(vp.pan_x(), -100.0);
        assert_eq!(vp.pan_y(), -50.0);
        assert_eq!(vp.scale(), 1.0);
    }

    #[test]
    fn pane_transforms_share_scale_and_split_pan() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-120.0, -80.0, 1.0);
        let t = vp.transforms().clone();
        assert_eq!(t.main.tx, -120.0);
        assert_eq!(t.main.ty, -80.0);
        assert_eq!(t.column_header.tx, -120.0);
        assert_eq!(t.column_header.ty, 0.0);
        assert_eq!(t.row_header.tx, 0.0);
        assert_eq!(t.row_header.ty, -80.0);
        assert_eq!(t.corner.tx, 0.0);
        assert_eq!(t.corner.ty, 0.0);
        assert_eq!(t.corner.scale, t.main.scale);
    }

    #[test]
    fn transform_cache_tracks_version() {
        let mut vp = viewport_800x600();
        let v0 = vp.version();
        let _ = vp.transforms();
        vp.pan_by(-10.0, 0.0);
        assert!(vp.version() > v0);
        assert_eq!(vp.transforms().main.tx, -10.0);
    }

    #[test]
    fn zoom_anchor_point_is_stationary() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-200.0, -150.0, 1.0);

        let focal = (400.0, 300.0);
        let before = vp.transform_for(PaneKind::Main).unmap(focal.0, focal.1);
        vp.zoom_at(focal.0, focal.1, 1.5);
        let after = vp.transform_for(PaneKind::Main).unmap(focal.0, focal.1);

        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn zoom_out_at_origin_keeps_origin() {
        let mut vp = viewport_800x600();
        let before = vp.transform_for(PaneKind::Main).unmap(0.0, 0.0);
        vp.zoom_at(0.0, 0.0, 0.75);
        let after = vp.transform_for(PaneKind::Main).unmap(0.0, 0.0);
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn degenerate_zoom_factor_is_ignored() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-100.0, -100.0, 1.0);
        vp.zoom_at(10.0, 10.0, f32::NAN);
        vp.zoom_at(10.0, 10.0, 0.0);
        vp.zoom_at(10.0, 10.0, -2.0);
        assert_eq!(vp.scale(), 1.0);
        assert_eq!(vp.pan_x(), -100.0);
    }

    #[test]
    fn transform_roundtrip() {
        let t = Transform {
            scale: 2.0,
            tx: -30.0,
            ty: 40.0,
        };
        let (sx, sy) = t.map(10.0, 20.0);
        let (cx, cy) = t.unmap(sx, sy);
        assert!((cx - 10.0).abs() < 1e-5);
        assert!((cy - 20.0).abs() < 1e-5);

        let inv = t.invert();
        let (ix, iy) = inv.map(sx, sy);
        assert!((ix - 10.0).abs() < 1e-5);
        assert!((iy - 20.0).abs() < 1e-5);
    }

    #[test]
    fn degenerate_transform_inversion_is_total() {
        let t = Transform {
            scale: 0.0,
            tx: 5.0,
            ty: -5.0,
        };
        let (x, y) = t.unmap(12.0, 3.0);
        assert!(x.is_finite() && y.is_finite());
        let inv = t.invert();
        assert!(inv.scale.is_finite());
    }

    #[test]
    fn visible_origin_is_stable_under_origin_zoom() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-120.0, -60.0, 1.0);
        let before = vp.visible_origin();
        assert_eq!(before, (120.0, 60.0));

        // Zooming about the screen origin keeps the same content point in
        // the top-left corner.
        vp.zoom_at(0.0, 0.0, 2.0);
        let after = vp.visible_origin();
        assert!((before.0 - after.0).abs() < 1e-3);
        assert!((before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn scroll_metrics_follow_viewport() {
        let mut vp = viewport_800x600();
        vp.set_viewport(-250.0, -125.0, 1.0);
        let m = vp.scroll_metrics();
        assert_eq!(m.horizontal_range, 2000.0);
        assert_eq!(m.horizontal_offset, 250.0);
        assert_eq!(m.vertical_range, 1500.0);
        assert_eq!(m.vertical_offset, 125.0);
    }
}
