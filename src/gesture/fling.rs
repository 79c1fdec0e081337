//! Inertial scroll physics.
//!
//! A fling starts from the release velocity of a drag and decays it with a
//! per-tick friction factor, producing pan deltas until the speed drops
//! below the stop threshold or the pan range clamps at an edge. Each tick
//! is a discrete callback from the host's frame loop; there is no internal
//! timer, so cancelling between ticks is always safe.

use std::collections::VecDeque;

use crate::types::FlingConfig;

/// Window over which release velocity is estimated, matching the usual
/// platform velocity trackers.
const VELOCITY_WINDOW_MS: f64 = 100.0;

/// Nominal tick rate the friction factor is calibrated against.
const NOMINAL_TICK_HZ: f32 = 60.0;

/// Rolling pointer-position samples for release-velocity estimation.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(f64, f32, f32)>,
}

impl VelocityTracker {
    /// Record a pointer position; samples older than the window are pruned.
    pub fn push(&mut self, timestamp_ms: f64, x: f32, y: f32) {
        self.samples.push_back((timestamp_ms, x, y));
        while let Some(&(t, _, _)) = self.samples.front() {
            if timestamp_ms - t > VELOCITY_WINDOW_MS {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Drop all samples (pointer handoff or gesture end).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Estimated velocity in logical px/s over the sample window; zero
    /// when the window is too short to be meaningful.
    #[must_use]
    pub fn velocity(&self) -> (f32, f32) {
        let (Some(&(t0, x0, y0)), Some(&(t1, x1, y1))) =
            (self.samples.front(), self.samples.back())
        else {
            return (0.0, 0.0);
        };
        let dt_s = (t1 - t0) / 1000.0;
        if dt_s < 1e-3 {
            return (0.0, 0.0);
        }
        #[allow(clippy::cast_possible_truncation)]
        let dt_s = dt_s as f32;
        ((x1 - x0) / dt_s, (y1 - y0) / dt_s)
    }
}

/// A running inertial trajectory.
#[derive(Debug, Clone)]
pub struct Fling {
    vx: f32,
    vy: f32,
    last_tick_ms: f64,
    friction: f32,
    stop_threshold: f32,
}

impl Fling {
    /// Start a trajectory from a release velocity, or `None` when the
    /// speed is below the start threshold.
    #[must_use]
    pub fn start(vx: f32, vy: f32, now_ms: f64, config: &FlingConfig) -> Option<Fling> {
        let speed = vx.hypot(vy);
        if !speed.is_finite() || speed < config.min_velocity {
            return None;
        }
        Some(Fling {
            vx,
            vy,
            last_tick_ms: now_ms,
            friction: config.friction.clamp(0.0, 1.0),
            stop_threshold: config.stop_threshold.max(0.0),
        })
    }

    /// Advance one tick and return the pan delta to apply, or `None` when
    /// the trajectory has decayed to a stop. Velocity decays first, so the
    /// produced deltas are monotonically non-increasing in magnitude.
    #[must_use]
    pub fn tick(&mut self, now_ms: f64) -> Option<(f32, f32)> {
        let dt_s = ((now_ms - self.last_tick_ms) / 1000.0).max(0.0);
        self.last_tick_ms = now_ms;
        #[allow(clippy::cast_possible_truncation)]
        let dt_s = dt_s as f32;

        // Friction is calibrated per 60 Hz tick; scale the decay to the
        // actual elapsed time so variable frame rates behave the same.
        self.vx *= self.friction.powf(dt_s * NOMINAL_TICK_HZ);
        self.vy *= self.friction.powf(dt_s * NOMINAL_TICK_HZ);

        if self.vx.hypot(self.vy) < self.stop_threshold {
            self.vx = 0.0;
            self.vy = 0.0;
            return None;
        }
        Some((self.vx * dt_s, self.vy * dt_s))
    }

    /// Zero the velocity on an axis whose pan range clamped, so the
    /// trajectory never grinds against an edge.
    pub fn stop_axis(&mut self, x: bool, y: bool) {
        if x {
            self.vx = 0.0;
        }
        if y {
            self.vy = 0.0;
        }
    }

    /// Whether both axes have stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.vx.hypot(self.vy) < self.stop_threshold.max(f32::EPSILON)
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

    #[test]
    fn tracker_estimates_linear_motion() {
        let mut tracker = VelocityTracker::default();
        // 10 px per 10 ms => 1000 px/s in x.
        for i in 0..6 {
            tracker.push(f64::from(i) * 10.0, (i * 10) as f32, 0.0);
        }
        let (vx, vy) = tracker.velocity();
        assert!((vx - 1000.0).abs() < 1.0);
        assert!(vy.abs() < 1.0);
    }

    #[test]
    fn tracker_prunes_old_samples() {
        let mut tracker = VelocityTracker::default();
        tracker.push(0.0, 0.0, 0.0);
        tracker.push(500.0, 100.0, 0.0);
        tracker.push(510.0, 110.0, 0.0);
        // The 0 ms sample is outside the window; velocity comes from the
        // last two (10 px / 10 ms).
        let (vx, _) = tracker.velocity();
        assert!((vx - 1000.0).abs() < 1.0);
    }

    #[test]
    fn tracker_empty_is_zero() {
        let tracker = VelocityTracker::default();
        assert_eq!(tracker.velocity(), (0.0, 0.0));
    }

    #[test]
    fn slow_release_does_not_fling() {
        let config = FlingConfig::default();
        assert!(Fling::start(10.0, 10.0, 0.0, &config).is_none());
    }

    #[test]
    fn fling_decays_to_stop() {
        let config = FlingConfig::default();
        let mut fling = Fling::start(2000.0, 0.0, 0.0, &config).unwrap();

        let mut now = 0.0;
        let mut last_dx = f32::INFINITY;
        let mut ticks = 0;
        while let Some((dx, dy)) = fling.tick(now + 16.0) {
            now += 16.0;
            ticks += 1;
            assert!(dx.abs() <= last_dx.abs() + 1e-3, "must decelerate");
            assert_eq!(dy, 0.0);
            last_dx = dx;
            assert!(ticks < 1000, "fling did not stop");
        }
        assert!(fling.is_finished());
    }

    #[test]
    fn stop_axis_zeroes_velocity() {
        let config = FlingConfig::default();
        let mut fling = Fling::start(2000.0, 2000.0, 0.0, &config).unwrap();
        fling.stop_axis(true, false);
        let (dx, dy) = fling.tick(16.0).unwrap();
        assert_eq!(dx, 0.0);
        assert!(dy > 0.0);
    }
}
