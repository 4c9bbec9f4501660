//! L4 Atomic Layer: Step and stall arithmetic for the convergence loop
//!
//! Pure functions over numbers and timestamps; no host access.

/// Wall-clock window after which an unchanged remaining distance counts as settled.
pub const STALL_TIMEOUT_MS: f64 = 250.0;

/// Signed pixel step from `current` toward `target` for one frame.
///
/// The friction-divided delta is rounded up to whole pixels so the loop
/// always makes progress, then capped at the remaining distance so a
/// fractional target is never overshot.
#[inline]
pub fn step_toward(current: f64, target: f64, friction: f64) -> f64 {
    let distance = target - current;
    if !distance.is_finite() || distance == 0.0 {
        return 0.0;
    }
    let delta = distance / friction;
    delta.abs().ceil().min(distance.abs()).copysign(distance)
}

/// Tracks how long the distance to target has stayed the same.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StallTracker {
    /// Distance first seen at `since_ms`
    last: Option<f64>,
    since_ms: f64,
}

impl StallTracker {
    /// Record this frame's remaining distance. Returns true once the same
    /// distance has persisted for longer than [`STALL_TIMEOUT_MS`].
    pub fn observe(&mut self, distance: f64, now_ms: f64) -> bool {
        match self.last {
            Some(last) if last == distance => now_ms - self.since_ms > STALL_TIMEOUT_MS,
            _ => {
                self.last = Some(distance);
                self.since_ms = now_ms;
                false
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
