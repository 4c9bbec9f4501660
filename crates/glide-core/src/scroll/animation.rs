//! L3 Molecular Layer: Convergence animator state machine
//!
//! Combines the step and stall atoms into the Idle → Running → Idle loop.
//! The animator decides; the scroller performs the host reads and writes.

use serde::Serialize;

use super::timing::{step_toward, StallTracker};

/// Why a running animation went back to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The native position landed exactly on the target.
    Reached,
    /// The remaining distance stopped changing for longer than the stall window.
    Stalled,
    /// The scroller was torn down mid-animation.
    Cancelled,
}

/// Animator state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnimatorState {
    #[default]
    Idle,
    Running {
        stall: StallTracker,
        /// Whether iframe input was blocked when this run started
        iframes_blocked: bool,
    },
}

/// Result of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Keep going; another frame must be requested.
    Continue,
    /// Back to idle.
    Stop {
        reason: StopReason,
        iframes_blocked: bool,
    },
}

/// Convergence animator
///
/// Exactly one run can be active at a time: [`Self::start`] only succeeds
/// from `Idle`, so callers that schedule a frame on success can never end
/// up with two loops for one scroller.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceAnimator {
    state: AnimatorState,
}

impl ConvergenceAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimatorState::Running { .. })
    }

    /// Idle → Running. Returns false (and changes nothing) when already running.
    pub fn start(&mut self, iframes_blocked: bool) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = AnimatorState::Running {
            stall: StallTracker::default(),
            iframes_blocked,
        };
        true
    }

    /// Step to apply this frame, or `None` when idle.
    pub fn plan(&self, current: f64, target: f64, friction: f64) -> Option<f64> {
        self.is_running()
            .then(|| step_toward(current, target, friction))
    }

    /// Feed the outcome of the frame's write back into the state machine.
    ///
    /// `remaining` is the distance to target read back after the write. A
    /// distance that stops changing for longer than the stall window means
    /// the host is not taking the writes (detached, or rounding to pixels).
    pub fn advance(&mut self, remaining: f64, now_ms: f64) -> Tick {
        let AnimatorState::Running {
            mut stall,
            iframes_blocked,
        } = self.state
        else {
            return Tick::Stop {
                reason: StopReason::Cancelled,
                iframes_blocked: false,
            };
        };

        let reason = if remaining == 0.0 {
            Some(StopReason::Reached)
        } else if stall.observe(remaining.abs(), now_ms) {
            Some(StopReason::Stalled)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                self.state = AnimatorState::Idle;
                Tick::Stop {
                    reason,
                    iframes_blocked,
                }
            }
            None => {
                self.state = AnimatorState::Running {
                    stall,
                    iframes_blocked,
                };
                Tick::Continue
            }
        }
    }

    /// Force back to idle, reporting whether iframes still need releasing.
    pub fn cancel(&mut self) -> bool {
        let blocked = matches!(
            self.state,
            AnimatorState::Running {
                iframes_blocked: true,
                ..
            }
        );
        self.state = AnimatorState::Idle;
        blocked
    }
}
