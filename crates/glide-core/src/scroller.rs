//! The scroller instance: one managed element, one target offset, one animator.
//!
//! A host feeds it three kinds of input, in dispatch order:
//! - [`SmoothScroller::handle_wheel`] for every wheel event,
//! - [`SmoothScroller::handle_scroll`] for every native scroll notification,
//! - [`SmoothScroller::on_frame`] once per frame it was asked for.

use serde::Serialize;

use crate::config::ScrollerConfig;
use crate::delegation::{is_delegated, WheelSense};
use crate::geometry::{Axis, AxisBounds, Direction, TargetOffset};
use crate::host::ScrollHost;
use crate::scroll::{
    normalize_delta, resolve_axis, ConvergenceAnimator, ScrollerConfigExt, StopReason, Tick,
    WheelInput, WheelOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Listening and animating.
    Active,
    /// The host cannot support smooth scrolling; nothing was attached.
    Disabled,
    /// Torn down. No further host reads or writes.
    Destroyed,
}

/// What one animation frame did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Stale frame (idle or torn down); nothing read or written.
    Skipped,
    /// Position written, another frame requested.
    Continued {
        axis: Axis,
        position: f64,
        step: f64,
    },
    /// Position written, animation finished.
    Finished {
        axis: Axis,
        position: f64,
        reason: StopReason,
    },
}

pub struct SmoothScroller<H: ScrollHost> {
    host: H,
    config: ScrollerConfig,
    target: TargetOffset,
    animator: ConvergenceAnimator,
    lifecycle: Lifecycle,
}

impl<H: ScrollHost> SmoothScroller<H> {
    /// Bind a scroller to `host`, seeding the target from the current
    /// native offsets. Unsupported hosts yield a disabled scroller.
    pub fn new(host: H, config: ScrollerConfig) -> Self {
        let (lifecycle, target) = if host.supports_smooth_scroll() {
            let extent = host.extent();
            tracing::info!(direction = %config.direction, "smooth scroller attached");
            (
                Lifecycle::Active,
                TargetOffset {
                    x: extent.x,
                    y: extent.y,
                },
            )
        } else {
            tracing::warn!("host does not support smooth scrolling, scroller disabled");
            (Lifecycle::Disabled, TargetOffset::default())
        };

        Self {
            host,
            config,
            target,
            animator: ConvergenceAnimator::new(),
            lifecycle,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    /// Live tuning; changes apply from the next event or frame.
    pub fn config_mut(&mut self) -> &mut ScrollerConfig {
        &mut self.config
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.config.direction = direction;
    }

    pub fn target_offset(&self) -> TargetOffset {
        self.target
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Accumulate one wheel event into the target offset.
    ///
    /// `target` is the event's target container, if the host knows it.
    /// Only [`WheelOutcome::Accumulated`] means the host must suppress the
    /// native default action.
    pub fn handle_wheel(
        &mut self,
        input: &WheelInput,
        target: Option<H::Container>,
    ) -> WheelOutcome {
        if !self.is_active() {
            return WheelOutcome::Ignored;
        }

        let delta = input.primary_delta();
        if delta == 0.0 || !delta.is_finite() {
            return WheelOutcome::Ignored;
        }

        if let Some(target) = target {
            if is_delegated(target, &self.host.root(), WheelSense::of(delta)) {
                return WheelOutcome::Delegated;
            }
        }

        let viewport = self.host.viewport();
        let extent = self.host.extent();
        let axis = resolve_axis(self.config.direction, viewport, extent);
        let bounds = AxisBounds::compute(axis, viewport, extent);

        let increment = self.config.wheel_increment(normalize_delta(delta));
        let next = bounds.clamp(self.target.get(axis) + increment);
        self.target.set(axis, next);

        let started = self.start_animation();
        tracing::debug!(
            %axis,
            delta,
            target = next,
            max = bounds.max,
            started,
            "wheel accumulated"
        );

        WheelOutcome::Accumulated {
            axis,
            target: next,
            started,
        }
    }

    /// Native scroll notification. Outside an animation the user (or other
    /// code) moved the element, so the target follows the native position.
    /// Returns true when the target was resynchronized.
    pub fn handle_scroll(&mut self) -> bool {
        if !self.is_active() || self.animator.is_running() {
            return false;
        }
        let extent = self.host.extent();
        self.target = TargetOffset {
            x: extent.x,
            y: extent.y,
        };
        true
    }

    /// One display frame of the convergence loop.
    pub fn on_frame(&mut self) -> FrameOutcome {
        if !self.is_active() || !self.animator.is_running() {
            return FrameOutcome::Skipped;
        }

        let viewport = self.host.viewport();
        let extent = self.host.extent();
        let axis = resolve_axis(self.config.direction, viewport, extent);
        let current = extent.offset(axis);
        let target = self.target.get(axis);

        let Some(step) = self
            .animator
            .plan(current, target, self.config.effective_friction())
        else {
            return FrameOutcome::Skipped;
        };

        self.host.set_scroll(axis, current + step);

        let position = self.host.extent().offset(axis);
        let now = self.host.now_ms();
        match self.animator.advance(target - position, now) {
            Tick::Continue => {
                self.host.request_frame();
                FrameOutcome::Continued {
                    axis,
                    position,
                    step,
                }
            }
            Tick::Stop {
                reason,
                iframes_blocked,
            } => {
                if iframes_blocked {
                    self.host.set_iframes_blocked(false);
                }
                tracing::debug!(%axis, position, ?reason, "animation finished");
                FrameOutcome::Finished {
                    axis,
                    position,
                    reason,
                }
            }
        }
    }

    /// Stop listening and animating. Safe to call any number of times.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        if self.animator.cancel() {
            self.host.set_iframes_blocked(false);
        }
        self.lifecycle = Lifecycle::Destroyed;
        tracing::info!("smooth scroller destroyed");
    }

    fn start_animation(&mut self) -> bool {
        if self.animator.is_running() {
            return false;
        }
        let block = self.config.disable_iframes;
        if block {
            self.host.set_iframes_blocked(true);
        }
        self.animator.start(block);
        self.host.request_frame();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegation::Overflow;
    use crate::geometry::Size;
    use crate::scroll::STALL_TIMEOUT_MS;
    use crate::sim::{run_until_idle, NodeSpec, SimHost, SimScene, FRAME_MS};

    /// Content 1000 wide, viewport 400 wide: max x offset 600.
    fn wide_scene() -> SimScene {
        SimScene::new(Size::new(400.0, 300.0), Size::new(1000.0, 300.0))
    }

    fn scroller(scene: &SimScene, direction: Direction) -> SmoothScroller<SimHost> {
        SmoothScroller::new(
            SimHost::new(scene.root()),
            ScrollerConfig::with_direction(direction),
        )
    }

    #[test]
    fn test_wheel_accumulates_increment() {
        let scene = wide_scene();
        let mut scroller = scroller(&scene, Direction::X);

        let outcome = scroller.handle_wheel(&WheelInput::vertical(100.0), None);

        assert_eq!(
            outcome,
            WheelOutcome::Accumulated {
                axis: Axis::X,
                target: 112.5,
                started: true
            }
        );
        assert_eq!(scroller.target_offset().x, 112.5);
        assert!(scroller.is_animating());
    }

    #[test]
    fn test_target_clamped_to_max() {
        let scene = wide_scene();
        scene.root().set_offset(Axis::X, 590.0);
        let mut scroller = scroller(&scene, Direction::X);
        assert_eq!(scroller.target_offset().x, 590.0);

        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert_eq!(scroller.target_offset().x, 600.0);
    }

    #[test]
    fn test_converges_to_target_and_idles() {
        let scene = wide_scene();
        let mut scroller = scroller(&scene, Direction::X);
        scroller.config_mut().velocity = 25.0;
        scroller.config_mut().wheel_delta_scale = 1.0;

        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert_eq!(scroller.target_offset().x, 25.0);

        assert!(scroller.host_mut().take_frame());
        let first = scroller.on_frame();
        assert_eq!(
            first,
            FrameOutcome::Continued {
                axis: Axis::X,
                position: 3.0,
                step: 3.0
            }
        );

        let frames = run_until_idle(&mut scroller, FRAME_MS, 200);
        assert!(frames < 200);
        assert_eq!(scene.root().offset(Axis::X), 25.0);
        assert!(!scroller.is_animating());
    }

    #[test]
    fn test_detached_element_stalls_out() {
        let scene = wide_scene();
        let mut scroller = scroller(&scene, Direction::X);
        scroller.handle_wheel(&WheelInput::vertical(1.0), None);

        // writes stop landing: the distance never changes
        scene.root().detach();

        let mut last = FrameOutcome::Skipped;
        let mut elapsed = 0.0;
        while scroller.host_mut().take_frame() {
            last = scroller.on_frame();
            elapsed += FRAME_MS;
            scroller.host_mut().advance(FRAME_MS);
            assert!(elapsed < 1000.0, "stall path never fired");
        }
        assert!(matches!(
            last,
            FrameOutcome::Finished {
                reason: StopReason::Stalled,
                ..
            }
        ));
        assert!(elapsed > STALL_TIMEOUT_MS);
        assert!(!scroller.is_animating());
    }

    #[test]
    fn test_unchanged_distance_stalls_after_timeout() {
        // 260 ms between two observations of the same distance
        let scene = wide_scene();
        let mut scroller = scroller(&scene, Direction::X);
        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        scene.root().detach();

        scroller.host_mut().take_frame();
        assert!(matches!(scroller.on_frame(), FrameOutcome::Continued { .. }));
        scroller.host_mut().advance(260.0);
        scroller.host_mut().take_frame();
        assert!(matches!(
            scroller.on_frame(),
            FrameOutcome::Finished {
                reason: StopReason::Stalled,
                ..
            }
        ));
        assert_eq!(scroller.host().pending_frames(), 0);
    }

    #[test]
    fn test_pixel_rounding_host_stalls_near_target() {
        let scene = wide_scene();
        let mut host = SimHost::new(scene.root());
        host.set_round_writes(true);
        let mut scroller = SmoothScroller::new(host, ScrollerConfig::with_direction(Direction::X));
        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert_eq!(scroller.target_offset().x, 112.5);
        assert!(scroller.host().iframes_blocked());

        let mut outcomes = Vec::new();
        let mut elapsed = 0.0;
        while scroller.host_mut().take_frame() {
            outcomes.push(scroller.on_frame());
            scroller.host_mut().advance(FRAME_MS);
            elapsed += FRAME_MS;
            assert!(elapsed < 2000.0, "stall path never fired");
        }

        let Some(&FrameOutcome::Finished {
            position, reason, ..
        }) = outcomes.last()
        else {
            panic!("expected the animation to finish");
        };
        assert_eq!(reason, StopReason::Stalled);
        assert_eq!(position, 113.0);

        // the tail of the run: sub-pixel steps that the host keeps rounding away
        let tail: Vec<f64> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                FrameOutcome::Continued { position, step, .. } if *position == 113.0 => {
                    Some(*step)
                }
                _ => None,
            })
            .collect();
        // about 250 ms of frames at 60 Hz
        assert!(tail.len() >= 15);
        assert!(tail.iter().all(|step| step.abs() <= 1.0));

        assert!(!scroller.is_animating());
        assert!(!scroller.host().iframes_blocked());
    }

    #[test]
    fn test_moderate_friction_reaches_target() {
        for friction in [16.0, 20.0, 37.0, 60.0] {
            let scene = wide_scene();
            let mut scroller = scroller(&scene, Direction::X);
            scroller.config_mut().friction = friction;
            scroller.handle_wheel(&WheelInput::vertical(1.0), None);

            let mut last = FrameOutcome::Skipped;
            while scroller.host_mut().take_frame() {
                last = scroller.on_frame();
                scroller.host_mut().advance(FRAME_MS);
            }

            assert_eq!(
                last,
                FrameOutcome::Finished {
                    axis: Axis::X,
                    position: 112.5,
                    reason: StopReason::Reached
                },
                "friction {friction}"
            );
            assert_eq!(scene.root().offset(Axis::X), 112.5);
        }
    }

    #[test]
    fn test_zero_delta_is_ignored() {
        let scene = wide_scene();
        let mut scroller = scroller(&scene, Direction::X);
        let before = scroller.target_offset();

        let outcome = scroller.handle_wheel(&WheelInput::vertical(0.0), None);

        assert_eq!(outcome, WheelOutcome::Ignored);
        assert!(!outcome.suppresses_default());
        assert_eq!(scroller.target_offset(), before);
        assert!(!scroller.is_animating());
        assert_eq!(scroller.host().frames_requested(), 0);
    }

    #[test]
    fn test_wheel_while_running_schedules_one_frame() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);

        for _ in 0..5 {
            scroller.handle_wheel(&WheelInput::vertical(120.0), None);
            assert!(scroller.host().pending_frames() <= 1);
        }
        assert_eq!(scroller.host().frames_requested(), 1);
        assert_eq!(scroller.target_offset().y, 5.0 * 112.5);

        for _ in 0..10 {
            scroller.host_mut().take_frame();
            scroller.on_frame();
            scroller.handle_wheel(&WheelInput::vertical(120.0), None);
            assert!(scroller.host().pending_frames() <= 1);
            scroller.host_mut().advance(FRAME_MS);
        }
    }

    #[test]
    fn test_delegated_event_is_left_alone() {
        let scene = SimScene::new(Size::new(800.0, 600.0), Size::new(800.0, 3000.0));
        let list = scene.add_child(
            &scene.root(),
            NodeSpec::new("list", Size::new(300.0, 200.0), Size::new(300.0, 900.0))
                .overflow(Overflow::Hidden, Overflow::Auto),
        );
        let mut scroller = scroller(&scene, Direction::Y);

        let outcome = scroller.handle_wheel(&WheelInput::vertical(50.0), Some(list.clone()));

        assert_eq!(outcome, WheelOutcome::Delegated);
        assert!(!outcome.suppresses_default());
        assert_eq!(scroller.target_offset().y, 0.0);
        assert!(!scroller.is_animating());

        // once the list is exhausted the page takes over
        list.set_offset(Axis::Y, 700.0);
        let outcome = scroller.handle_wheel(&WheelInput::vertical(50.0), Some(list));
        assert!(outcome.suppresses_default());
        assert_eq!(scroller.target_offset().y, 112.5);
    }

    #[test]
    fn test_xy_prefers_horizontal() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(1000.0, 1000.0));
        let mut scroller = scroller(&scene, Direction::XY);

        scroller.handle_wheel(&WheelInput::vertical(10.0), None);

        assert_eq!(scroller.target_offset().x, 112.5);
        assert_eq!(scroller.target_offset().y, 0.0);
    }

    #[test]
    fn test_no_overflow_does_not_move() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 300.0));
        let mut scroller = scroller(&scene, Direction::Y);

        let outcome = scroller.handle_wheel(&WheelInput::vertical(10.0), None);
        assert_eq!(
            outcome,
            WheelOutcome::Accumulated {
                axis: Axis::Y,
                target: 0.0,
                started: true
            }
        );

        run_until_idle(&mut scroller, FRAME_MS, 100);
        assert!(!scroller.is_animating());
        assert_eq!(scene.root().offset(Axis::Y), 0.0);
    }

    #[test]
    fn test_scroll_sync_only_when_idle() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);

        scene.root().set_offset(Axis::Y, 800.0);
        assert!(scroller.handle_scroll());
        assert_eq!(scroller.target_offset().y, 800.0);

        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        scroller.host_mut().take_frame();
        scroller.on_frame();
        assert!(!scroller.handle_scroll());
        assert_eq!(scroller.target_offset().y, 912.5);
    }

    #[test]
    fn test_iframes_blocked_while_animating() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);

        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert!(scroller.host().iframes_blocked());

        run_until_idle(&mut scroller, FRAME_MS, 500);
        assert!(!scroller.host().iframes_blocked());
    }

    #[test]
    fn test_iframes_untouched_when_disabled() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);
        scroller.config_mut().disable_iframes = false;

        scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert!(!scroller.host().iframes_blocked());
        assert_eq!(scroller.host().iframe_toggles(), 0);
    }

    #[test]
    fn test_destroy_is_idempotent_and_final() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);
        scroller.handle_wheel(&WheelInput::vertical(1.0), None);

        scroller.destroy();
        scroller.destroy();

        assert_eq!(scroller.lifecycle(), Lifecycle::Destroyed);
        assert!(!scroller.host().iframes_blocked());

        // the frame that was already scheduled fires once, harmlessly
        let requested = scroller.host().frames_requested();
        assert!(scroller.host_mut().take_frame());
        assert_eq!(scroller.on_frame(), FrameOutcome::Skipped);
        assert_eq!(scroller.host().frames_requested(), requested);
        assert_eq!(scene.root().offset(Axis::Y), 0.0);

        let outcome = scroller.handle_wheel(&WheelInput::vertical(1.0), None);
        assert_eq!(outcome, WheelOutcome::Ignored);
    }

    #[test]
    fn test_unsupported_host_is_inert() {
        let scene = wide_scene();
        let mut host = SimHost::new(scene.root());
        host.set_supported(false);
        let mut scroller = SmoothScroller::new(host, ScrollerConfig::with_direction(Direction::X));

        assert_eq!(scroller.lifecycle(), Lifecycle::Disabled);
        assert_eq!(
            scroller.handle_wheel(&WheelInput::vertical(1.0), None),
            WheelOutcome::Ignored
        );
        assert!(!scroller.handle_scroll());
        scroller.destroy();
        assert_eq!(scroller.lifecycle(), Lifecycle::Destroyed);
    }

    #[test]
    fn test_friction_change_applies_next_frame() {
        let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 5000.0));
        let mut scroller = scroller(&scene, Direction::Y);
        scroller.handle_wheel(&WheelInput::vertical(1.0), None);

        scroller.config_mut().friction = 1.0;
        scroller.host_mut().take_frame();
        let FrameOutcome::Finished {
            position, reason, ..
        } = scroller.on_frame()
        else {
            panic!("expected the first frame to finish");
        };
        assert_eq!(position, 112.5);
        assert_eq!(reason, StopReason::Reached);
    }

    #[test]
    fn test_terminates_for_any_friction() {
        for friction in [1.0, 1.5, 4.0, 10.0, 37.0, 250.0] {
            let scene = SimScene::new(Size::new(400.0, 300.0), Size::new(400.0, 100_000.0));
            let mut scroller = scroller(&scene, Direction::Y);
            scroller.config_mut().friction = friction;
            for _ in 0..20 {
                scroller.handle_wheel(&WheelInput::vertical(3.0), None);
            }
            let frames = run_until_idle(&mut scroller, FRAME_MS, 10_000);
            assert!(frames < 10_000, "friction {friction} did not settle");
            assert!(!scroller.is_animating());
        }
    }
}
