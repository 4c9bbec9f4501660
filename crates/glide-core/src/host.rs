//! Seams between the engine and whatever owns the real scroll container.
//!
//! The engine never touches a DOM directly. Everything it needs to read or
//! write goes through these traits, so the same accumulator and animator run
//! against a browser element (`glide-web`) or the in-memory [`crate::sim`]
//! scene.

use crate::delegation::ScrollContainer;
use crate::geometry::{Axis, ScrollExtent, Size};

/// Geometry provider plus native scroll writer for the managed element.
///
/// Values may change between any two calls; callers must not cache them.
pub trait ScrollSurface {
    /// Visible width/height. The viewport size when the element is the
    /// whole document.
    fn viewport(&self) -> Size;

    /// Content size and current native offsets.
    fn extent(&self) -> ScrollExtent;

    /// Write the native offset for one axis. Not animated by the host and
    /// not guaranteed to be observable until the next [`Self::extent`].
    fn set_scroll(&mut self, axis: Axis, value: f64);
}

/// Everything else a scroller needs from its host environment.
pub trait ScrollHost: ScrollSurface {
    type Container: ScrollContainer;

    /// The managed element as a delegation-walk node.
    fn root(&self) -> Self::Container;

    /// Monotonic wall clock in milliseconds.
    fn now_ms(&self) -> f64;

    /// Ask for exactly one call to `SmoothScroller::on_frame` on the next
    /// display refresh.
    fn request_frame(&mut self);

    /// Toggle pointer interaction on embedded frames while animating.
    fn set_iframes_blocked(&mut self, _blocked: bool) {}

    /// False on hosts known to mishandle scripted native scrolling.
    fn supports_smooth_scroll(&self) -> bool {
        true
    }
}
