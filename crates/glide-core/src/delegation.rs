//! Nested-scroll ownership: does a wheel event belong to a descendant?
//!
//! Starting at the event target, walk up the container tree until the
//! scroller's own element is reached. If any container on the way can still
//! scroll in the wheel's direction, that container owns the event and the
//! scroller must let it through untouched.

use std::str::FromStr;

use crate::error::Error;
use crate::geometry::{Axis, ScrollExtent, Size};

/// Computed `overflow-x` / `overflow-y` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Scroll,
    Auto,
}

impl Overflow {
    /// Lenient parse for computed-style values. Unknown keywords behave
    /// like `visible`; `overlay` is a legacy alias of `auto`.
    pub fn from_css(value: &str) -> Self {
        value.parse().unwrap_or(Overflow::Visible)
    }

    /// `auto` or `scroll`: the container scrolls its own content.
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

impl FromStr for Overflow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" => Ok(Overflow::Visible),
            "hidden" => Ok(Overflow::Hidden),
            "clip" => Ok(Overflow::Clip),
            "scroll" => Ok(Overflow::Scroll),
            "auto" | "overlay" => Ok(Overflow::Auto),
            other => Err(Error::InvalidOverflow(other.to_string())),
        }
    }
}

/// A node in a tree of possibly scrollable containers.
pub trait ScrollContainer: Sized {
    /// Computed overflow policy as `(x, y)`.
    fn overflow(&self) -> (Overflow, Overflow);

    /// Visible frame size.
    fn frame(&self) -> Size;

    /// Content size and current offsets.
    fn extent(&self) -> ScrollExtent;

    fn parent(&self) -> Option<Self>;

    /// Identity comparison, not structural equality.
    fn is_same(&self, other: &Self) -> bool;
}

/// Sign of the wheel delta as seen by the delegation walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelSense {
    Forward,
    Backward,
}

impl WheelSense {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            WheelSense::Forward
        } else {
            WheelSense::Backward
        }
    }
}

/// True when some container from `target` up to (excluding) `root` can
/// still scroll in `sense`, meaning it should receive the wheel natively.
pub fn is_delegated<C: ScrollContainer>(target: C, root: &C, sense: WheelSense) -> bool {
    let mut node = Some(target);

    while let Some(current) = node {
        if current.is_same(root) {
            return false;
        }

        let (overflow_x, overflow_y) = current.overflow();
        if overflow_x != Overflow::Visible || overflow_y != Overflow::Visible {
            let frame = current.frame();
            let extent = current.extent();

            if overflow_x.is_scrollable() && has_capacity(Axis::X, frame, extent, sense) {
                tracing::debug!(axis = %Axis::X, "wheel delegated to nested container");
                return true;
            }
            if overflow_y.is_scrollable() && has_capacity(Axis::Y, frame, extent, sense) {
                tracing::debug!(axis = %Axis::Y, "wheel delegated to nested container");
                return true;
            }
        }

        node = current.parent();
    }

    false
}

fn has_capacity(axis: Axis, frame: Size, extent: ScrollExtent, sense: WheelSense) -> bool {
    let visible = frame.along(axis).ceil();
    let content = extent.content(axis).ceil();
    if content <= visible {
        return false;
    }

    let offset = extent.offset(axis);
    match sense {
        WheelSense::Forward => (offset + frame.along(axis)).ceil() < content,
        WheelSense::Backward => offset > 0.0,
    }
}
