use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use glide_core::scene::{BuiltScene, SceneAction, SceneFile};
use glide_core::sim::{SimHost, FRAME_MS};
use glide_core::{
    AppConfig, Axis, Direction, FrameOutcome, ScrollContainer, ScrollerConfig, Size,
    SmoothScroller, TargetOffset, WheelOutcome,
};

/// Tunables given on the command line; they win over scene and user config.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub direction: Option<Direction>,
    pub velocity: Option<f64>,
    pub friction: Option<f64>,
    pub wheel_delta_scale: Option<f64>,
}

impl Overrides {
    fn apply(&self, config: &mut ScrollerConfig) {
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if let Some(velocity) = self.velocity {
            config.velocity = velocity;
        }
        if let Some(friction) = self.friction {
            config.friction = friction;
        }
        if let Some(scale) = self.wheel_delta_scale {
            config.wheel_delta_scale = scale;
        }
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub json: bool,
    pub realtime: bool,
    pub max_frames: usize,
    pub overrides: Overrides,
}

/// One line of the replay trace.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEntry {
    Wheel {
        at_ms: f64,
        target: String,
        outcome: WheelOutcome,
    },
    Scroll {
        at_ms: f64,
        axis: Axis,
        to: f64,
        synced: bool,
    },
    Resize {
        at_ms: f64,
        target: String,
    },
    Detach {
        at_ms: f64,
        target: String,
    },
    Destroy {
        at_ms: f64,
    },
    Frame {
        at_ms: f64,
        outcome: FrameOutcome,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub config: ScrollerConfig,
    pub frames: usize,
    pub truncated: bool,
    pub target: TargetOffset,
    pub position: TargetOffset,
    pub entries: Vec<TraceEntry>,
}

/// A scene being replayed through a scroller bound to its root.
pub struct Replay {
    built: BuiltScene,
    scroller: SmoothScroller<SimHost>,
    next_event: usize,
    frames: usize,
    entries: Vec<TraceEntry>,
}

impl Replay {
    pub fn new(built: BuiltScene, config: ScrollerConfig) -> Self {
        let mut host = SimHost::new(built.scene.root());
        host.set_round_writes(built.round_writes);
        let scroller = SmoothScroller::new(host, config);
        Self {
            built,
            scroller,
            next_event: 0,
            frames: 0,
            entries: Vec::new(),
        }
    }

    /// No events left and no frame scheduled.
    pub fn is_finished(&self) -> bool {
        self.next_event >= self.built.events.len() && self.scroller.host().pending_frames() == 0
    }

    /// Time of the next scripted event, if any.
    pub fn next_event_at(&self) -> Option<f64> {
        self.built.events.get(self.next_event).map(|e| e.at_ms)
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Advance to `now_ms`: dispatch every event due by then, then run the
    /// scheduled frame if there is one.
    pub fn step(&mut self, now_ms: f64) -> Result<()> {
        self.scroller.host_mut().set_now(now_ms);

        while let Some(at_ms) = self.next_event_at() {
            if at_ms > now_ms {
                break;
            }
            let action = self.built.events[self.next_event].action.clone();
            self.next_event += 1;
            self.dispatch(now_ms, &action)?;
        }

        if self.scroller.host_mut().take_frame() {
            let outcome = self.scroller.on_frame();
            self.frames += 1;
            debug!(frame = self.frames, ?outcome, "frame");
            self.entries.push(TraceEntry::Frame {
                at_ms: now_ms,
                outcome,
            });
        }

        Ok(())
    }

    fn dispatch(&mut self, at_ms: f64, action: &SceneAction) -> Result<()> {
        match action {
            SceneAction::Wheel { target, .. } => {
                let node = self.built.node(target.as_deref())?;
                let input = action
                    .wheel_input()
                    .context("wheel action without wheel input")?;
                let outcome = self.scroller.handle_wheel(&input, Some(node.clone()));
                self.entries.push(TraceEntry::Wheel {
                    at_ms,
                    target: node.name(),
                    outcome,
                });
            }
            SceneAction::Scroll { axis, to } => {
                self.built.scene.root().set_offset(*axis, *to);
                let synced = self.scroller.handle_scroll();
                self.entries.push(TraceEntry::Scroll {
                    at_ms,
                    axis: *axis,
                    to: *to,
                    synced,
                });
            }
            SceneAction::Resize {
                target,
                content_width,
                content_height,
            } => {
                let node = self.built.node(target.as_deref())?;
                node.set_content(Size::new(*content_width, *content_height));
                self.entries.push(TraceEntry::Resize {
                    at_ms,
                    target: node.name(),
                });
            }
            SceneAction::Detach { target } => {
                let node = self.built.node(target.as_deref())?;
                node.detach();
                self.entries.push(TraceEntry::Detach {
                    at_ms,
                    target: node.name(),
                });
            }
            SceneAction::Destroy => {
                self.scroller.destroy();
                self.entries.push(TraceEntry::Destroy { at_ms });
            }
        }
        Ok(())
    }

    pub fn into_report(self, truncated: bool) -> Report {
        let extent = self.built.scene.root().extent();
        Report {
            config: self.scroller.config().clone(),
            frames: self.frames,
            truncated,
            target: self.scroller.target_offset(),
            position: TargetOffset {
                x: extent.x,
                y: extent.y,
            },
            entries: self.entries,
        }
    }
}

/// Replay on a virtual 60 Hz clock. Idle stretches jump straight to the
/// next scripted event.
pub fn replay_virtual(mut replay: Replay, max_frames: usize) -> Result<Report> {
    let mut now = 0.0;
    loop {
        replay.step(now)?;
        if replay.is_finished() {
            return Ok(replay.into_report(false));
        }
        if replay.frames() >= max_frames {
            warn!(max_frames, "frame limit reached, stopping replay");
            return Ok(replay.into_report(true));
        }

        now += FRAME_MS;
        if replay.scroller.host().pending_frames() == 0 {
            if let Some(at_ms) = replay.next_event_at() {
                now = f64::max(now, at_ms);
            }
        }
    }
}

/// Replay against wall-clock time, one step per display-rate tick.
pub async fn replay_realtime(mut replay: Replay, max_frames: usize) -> Result<Report> {
    let start = Instant::now();
    let mut ticker = interval(Duration::from_micros((FRAME_MS * 1000.0) as u64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let now = start.elapsed().as_secs_f64() * 1000.0;
        replay.step(now)?;
        if replay.is_finished() {
            return Ok(replay.into_report(false));
        }
        if replay.frames() >= max_frames {
            warn!(max_frames, "frame limit reached, stopping replay");
            return Ok(replay.into_report(true));
        }
    }
}

pub async fn run(scene_path: &Path, config: &AppConfig, options: &Options) -> Result<()> {
    let file = SceneFile::load(scene_path)
        .with_context(|| format!("failed to load scene {}", scene_path.display()))?;
    let built = file.build()?;

    let mut scroller_config = built
        .scroller
        .clone()
        .unwrap_or_else(|| config.scroller.clone());
    options.overrides.apply(&mut scroller_config);
    scroller_config.validate()?;

    info!(
        scene = %scene_path.display(),
        events = built.events.len(),
        realtime = options.realtime,
        "replaying scene"
    );

    let replay = Replay::new(built, scroller_config);
    let report = if options.realtime {
        replay_realtime(replay, options.max_frames).await?
    } else {
        replay_virtual(replay, options.max_frames)?
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    let config = &report.config;
    println!(
        "direction={} velocity={} friction={} wheel_delta_scale={}",
        config.direction, config.velocity, config.friction, config.wheel_delta_scale
    );
    println!();

    for entry in &report.entries {
        match entry {
            TraceEntry::Wheel {
                at_ms,
                target,
                outcome,
            } => {
                let detail = match outcome {
                    WheelOutcome::Ignored => "ignored".to_string(),
                    WheelOutcome::Delegated => "delegated to nested container".to_string(),
                    WheelOutcome::Accumulated {
                        axis,
                        target,
                        started,
                    } => format!(
                        "target {axis}={target:.1}{}",
                        if *started { " (animation started)" } else { "" }
                    ),
                };
                println!("{at_ms:>9.1} ms  wheel @ {target}: {detail}");
            }
            TraceEntry::Scroll {
                at_ms,
                axis,
                to,
                synced,
            } => {
                let note = if *synced { "target synced" } else { "ignored while animating" };
                println!("{at_ms:>9.1} ms  native scroll {axis}={to:.1}: {note}");
            }
            TraceEntry::Resize { at_ms, target } => {
                println!("{at_ms:>9.1} ms  resize {target}");
            }
            TraceEntry::Detach { at_ms, target } => {
                println!("{at_ms:>9.1} ms  detach {target}");
            }
            TraceEntry::Destroy { at_ms } => {
                println!("{at_ms:>9.1} ms  destroy");
            }
            TraceEntry::Frame { at_ms, outcome } => match outcome {
                FrameOutcome::Skipped => println!("{at_ms:>9.1} ms    frame skipped"),
                FrameOutcome::Continued {
                    axis,
                    position,
                    step,
                } => println!("{at_ms:>9.1} ms    {axis}={position:.1} ({step:+.1})"),
                FrameOutcome::Finished {
                    axis,
                    position,
                    reason,
                } => println!("{at_ms:>9.1} ms    {axis}={position:.1} finished: {reason:?}"),
            },
        }
    }

    println!();
    println!(
        "{} frames{}, position x={:.1} y={:.1}, target x={:.1} y={:.1}",
        report.frames,
        if report.truncated { " (truncated)" } else { "" },
        report.position.x,
        report.position.y,
        report.target.x,
        report.target.y
    );
}
