//! Axes, directions and the scroll-bounds arithmetic shared by the
//! accumulator, the animator and the delegation walk.
//!
//! Nothing here is cached: bounds are derived from a fresh [`Size`] and
//! [`ScrollExtent`] every time they are needed, because layout can change
//! between any two calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Which axes a scroller is allowed to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    X,
    #[default]
    Y,
    XY,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::XY => "xy",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Direction::X),
            "y" => Ok(Direction::Y),
            "xy" | "yx" => Ok(Direction::XY),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// Visible width and height of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Scrollable content size and current native offset of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollExtent {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScrollExtent {
    /// Current native offset along `axis`.
    pub fn offset(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Content length along `axis`.
    pub fn content(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Inclusive `[min, max]` range of valid scroll offsets on one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
}

impl AxisBounds {
    /// Bounds for `axis`: min is always 0, max is the floored overflow.
    ///
    /// Degenerate geometry (detached element, content smaller than the
    /// frame, NaN from a broken host) collapses to `[0, 0]`.
    pub fn compute(axis: Axis, visible: Size, extent: ScrollExtent) -> Self {
        let overflow = (extent.content(axis) - visible.along(axis)).floor();
        let max = if overflow.is_finite() && overflow > 0.0 {
            overflow
        } else {
            0.0
        };
        Self { min: 0.0, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Whether `axis` has content beyond its visible size.
pub fn overflows(axis: Axis, visible: Size, extent: ScrollExtent) -> bool {
    extent.content(axis) > visible.along(axis)
}

/// Per-axis target offset the animator converges toward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TargetOffset {
    pub x: f64,
    pub y: f64,
}

impl TargetOffset {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_floor_overflow() {
        let bounds = AxisBounds::compute(
            Axis::X,
            Size::new(400.5, 300.0),
            ScrollExtent {
                width: 1000.0,
                height: 300.0,
                ..Default::default()
            },
        );
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 599.0);
    }

    #[test]
    fn test_bounds_without_overflow() {
        let bounds = AxisBounds::compute(
            Axis::Y,
            Size::new(400.0, 800.0),
            ScrollExtent {
                width: 400.0,
                height: 300.0,
                ..Default::default()
            },
        );
        assert_eq!(bounds, AxisBounds { min: 0.0, max: 0.0 });
        assert_eq!(bounds.clamp(42.0), 0.0);
        assert_eq!(bounds.clamp(-3.0), 0.0);
    }

    #[test]
    fn test_clamp_always_within_bounds() {
        let bounds = AxisBounds {
            min: 0.0,
            max: 600.0,
        };
        for value in [-1e9, -1.0, 0.0, 0.5, 599.9, 600.0, 702.5, 1e9, f64::NAN] {
            let clamped = bounds.clamp(value);
            assert!((bounds.min..=bounds.max).contains(&clamped), "{value} -> {clamped}");
        }
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("x".parse::<Direction>().unwrap(), Direction::X);
        assert_eq!(" Y ".parse::<Direction>().unwrap(), Direction::Y);
        assert_eq!("xy".parse::<Direction>().unwrap(), Direction::XY);
        assert!(matches!(
            "diagonal".parse::<Direction>(),
            Err(Error::InvalidDirection(_))
        ));
    }
}
