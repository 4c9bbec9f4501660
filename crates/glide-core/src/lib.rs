pub mod config;
pub mod delegation;
pub mod error;
pub mod geometry;
pub mod host;
pub mod scene;
pub mod scroll;
pub mod scroller;
pub mod sim;

pub use config::{AppConfig, GeneralConfig, ScrollerConfig};
pub use delegation::{is_delegated, Overflow, ScrollContainer, WheelSense};
pub use error::{Error, Result};
pub use geometry::{Axis, AxisBounds, Direction, ScrollExtent, Size, TargetOffset};
pub use host::{ScrollHost, ScrollSurface};
pub use scroll::{StopReason, WheelInput, WheelOutcome};
pub use scroller::{FrameOutcome, Lifecycle, SmoothScroller};
