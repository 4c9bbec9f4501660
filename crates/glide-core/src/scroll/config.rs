//! L4 Atomic Layer: Effective tuning values for smooth scrolling
//!
//! Re-exports configuration from the crate root and clamps live-edited
//! values into a range the animator can always converge with.

// Re-export config types from the crate root
pub use crate::config::ScrollerConfig;

/// Extension trait for ScrollerConfig with sanitized accessors
pub trait ScrollerConfigExt {
    /// Friction as used by the animator: at least 1, always finite
    fn effective_friction(&self) -> f64;

    /// Target-offset increment for one normalized wheel delta
    fn wheel_increment(&self, normalized_delta: f64) -> f64;
}

impl ScrollerConfigExt for ScrollerConfig {
    #[inline]
    fn effective_friction(&self) -> f64 {
        if self.friction.is_finite() && self.friction >= 1.0 {
            self.friction
        } else {
            1.0
        }
    }

    #[inline]
    fn wheel_increment(&self, normalized_delta: f64) -> f64 {
        let increment = normalized_delta * self.wheel_delta_scale * self.velocity;
        if increment.is_finite() {
            increment
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_friction() {
        let mut config = ScrollerConfig::default();
        assert_eq!(config.effective_friction(), 10.0);

        config.friction = 0.0;
        assert_eq!(config.effective_friction(), 1.0);

        config.friction = f64::INFINITY;
        assert_eq!(config.effective_friction(), 1.0);
    }

    #[test]
    fn test_wheel_increment() {
        let config = ScrollerConfig::default();
        assert!((config.wheel_increment(1.0) - 112.5).abs() < 1e-9);
        assert!((config.wheel_increment(-0.5) + 56.25).abs() < 1e-9);

        let broken = ScrollerConfig {
            velocity: f64::NAN,
            ..Default::default()
        };
        assert_eq!(broken.wheel_increment(1.0), 0.0);
    }
}
