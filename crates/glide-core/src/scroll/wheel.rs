//! L4 Atomic Layer: Wheel input normalization and axis selection

use serde::Serialize;

use crate::geometry::{overflows, Axis, Direction, ScrollExtent, Size};

/// Divisor turning a legacy `wheelDeltaY` notch (±120/±160) into a delta.
pub const LEGACY_WHEEL_DIVISOR: f64 = 160.0;

/// The parts of a wheel event the engine looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelInput {
    pub delta_y: f64,
    /// Non-standard `wheelDeltaY`, present on some engines. Positive means
    /// "up", the opposite of `deltaY`.
    pub legacy_delta_y: Option<f64>,
}

impl WheelInput {
    pub fn vertical(delta_y: f64) -> Self {
        Self {
            delta_y,
            ..Default::default()
        }
    }

    /// The raw delta that drives the scroller, whatever axis it scrolls.
    pub fn primary_delta(&self) -> f64 {
        match self.legacy_delta_y {
            Some(legacy) => -legacy / LEGACY_WHEEL_DIVISOR,
            None => self.delta_y,
        }
    }
}

/// Map a raw delta of any unit into `[-1, 1]`, sign preserved.
#[inline]
pub fn normalize_delta(delta: f64) -> f64 {
    if delta.is_nan() {
        return 0.0;
    }
    delta.clamp(-1.0, 1.0)
}

/// Axis a wheel event should drive. With both axes enabled the horizontal
/// axis wins whenever it overflows.
pub fn resolve_axis(direction: Direction, viewport: Size, extent: ScrollExtent) -> Axis {
    match direction {
        Direction::X => Axis::X,
        Direction::Y => Axis::Y,
        Direction::XY if overflows(Axis::X, viewport, extent) => Axis::X,
        Direction::XY => Axis::Y,
    }
}

/// What a scroller did with one wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WheelOutcome {
    /// Zero delta or inactive scroller: left to the host.
    Ignored,
    /// A nested container can scroll; left to the host.
    Delegated,
    /// Target offset updated. The host must suppress the native scroll.
    Accumulated {
        axis: Axis,
        target: f64,
        started: bool,
    },
}

impl WheelOutcome {
    pub fn suppresses_default(&self) -> bool {
        matches!(self, WheelOutcome::Accumulated { .. })
    }
}
