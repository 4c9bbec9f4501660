//! Smooth scrolling engine
//!
//! Wheel input accumulates into a target offset; a frame-driven animator
//! moves the native scroll position toward it by a friction-divided step.
//!
//! ## L4 Atomic Layer
//! - `timing` - Step rounding and stall detection
//! - `wheel` - Delta normalization, axis selection, wheel outcomes
//! - `config` - Sanitized tuning accessors
//!
//! ## L3 Molecular Layer
//! - `animation` - Idle/Running convergence state machine

// L4 Atomic Layer
pub mod config;
pub mod timing;
pub mod wheel;

// L3 Molecular Layer
pub mod animation;

// Re-exports for convenient access
pub use animation::{AnimatorState, ConvergenceAnimator, StopReason, Tick};
pub use config::ScrollerConfigExt;
pub use timing::{StallTracker, STALL_TIMEOUT_MS};
pub use wheel::{normalize_delta, resolve_axis, WheelInput, WheelOutcome};
