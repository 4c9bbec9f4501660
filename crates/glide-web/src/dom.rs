//! DOM-backed implementations of the engine's host seams.

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, WheelEvent, Window};

use glide_core::{
    Axis, Overflow, ScrollContainer, ScrollExtent, ScrollHost, ScrollSurface, Size, WheelInput,
};

const POINTER_EVENTS: &str = "pointer-events";

/// Legacy EdgeHTML reports itself with an `Edge/` token; Chromium Edge uses `Edg/`.
pub fn is_legacy_edge(user_agent: &str) -> bool {
    user_agent.contains("Edge")
}

fn read_number(target: &JsValue, property: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(property))
        .ok()
        .and_then(|value| value.as_f64())
}

/// Fractional scroll offset, falling back to the integer accessor.
fn scroll_offset(element: &Element, axis: Axis) -> f64 {
    let (property, fallback) = match axis {
        Axis::X => ("scrollLeft", element.scroll_left()),
        Axis::Y => ("scrollTop", element.scroll_top()),
    };
    read_number(element.as_ref(), property).unwrap_or(fallback as f64)
}

fn element_extent(element: &Element) -> ScrollExtent {
    ScrollExtent {
        x: scroll_offset(element, Axis::X),
        y: scroll_offset(element, Axis::Y),
        width: element.scroll_width() as f64,
        height: element.scroll_height() as f64,
    }
}

fn bounding_size(element: &Element) -> Size {
    let rect = element.get_bounding_client_rect();
    Size::new(rect.width(), rect.height())
}

/// Wheel deltas as the engine wants them. `wheelDeltaY` is only set when
/// the event actually carries the property.
pub fn wheel_input(event: &WheelEvent) -> WheelInput {
    let legacy_delta_y = match Reflect::has(event.as_ref(), &JsValue::from_str("wheelDeltaY")) {
        Ok(true) => read_number(event.as_ref(), "wheelDeltaY"),
        _ => None,
    };
    WheelInput {
        delta_y: event.delta_y(),
        legacy_delta_y,
    }
}

/// An element seen by the delegation walk.
#[derive(Debug, Clone)]
pub struct DomContainer {
    element: Element,
}

impl DomContainer {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    fn computed(&self, property: &str) -> Overflow {
        web_sys::window()
            .and_then(|window| window.get_computed_style(&self.element).ok().flatten())
            .and_then(|style| style.get_property_value(property).ok())
            .map(|value| Overflow::from_css(&value))
            .unwrap_or_default()
    }
}

impl ScrollContainer for DomContainer {
    fn overflow(&self) -> (Overflow, Overflow) {
        (self.computed("overflow-x"), self.computed("overflow-y"))
    }

    fn frame(&self) -> Size {
        bounding_size(&self.element)
    }

    fn extent(&self) -> ScrollExtent {
        element_extent(&self.element)
    }

    fn parent(&self) -> Option<Self> {
        self.element.parent_element().map(Self::new)
    }

    fn is_same(&self, other: &Self) -> bool {
        self.element.is_same_node(Some(other.element.as_ref()))
    }
}

/// The managed element plus the browser services around it.
pub struct DomHost {
    window: Window,
    document: Document,
    element: Element,
    /// The whole page is managed through `document.documentElement`
    whole_document: bool,
    frame_requested: bool,
}

impl DomHost {
    /// Host for the page scroller (`target` is the document).
    pub fn for_document(window: Window, document: Document) -> Result<Self, JsValue> {
        let element = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?;
        Ok(Self {
            window,
            document,
            element,
            whole_document: true,
            frame_requested: false,
        })
    }

    /// Host for a scrollable element.
    pub fn for_element(window: Window, document: Document, element: HtmlElement) -> Self {
        Self {
            window,
            document,
            element: element.unchecked_into(),
            whole_document: false,
            frame_requested: false,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Where wheel and scroll listeners go.
    pub fn event_target(&self) -> web_sys::EventTarget {
        if self.whole_document {
            self.document.clone().unchecked_into()
        } else {
            self.element.clone().unchecked_into()
        }
    }

    /// Consume a frame request made by the scroller since the last call.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }
}

impl ScrollSurface for DomHost {
    fn viewport(&self) -> Size {
        if self.whole_document {
            let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
            let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
            Size::new(width.unwrap_or(0.0), height.unwrap_or(0.0))
        } else {
            bounding_size(&self.element)
        }
    }

    fn extent(&self) -> ScrollExtent {
        element_extent(&self.element)
    }

    fn set_scroll(&mut self, axis: Axis, value: f64) {
        let property = match axis {
            Axis::X => "scrollLeft",
            Axis::Y => "scrollTop",
        };
        if let Err(err) = Reflect::set(
            self.element.as_ref(),
            &JsValue::from_str(property),
            &JsValue::from_f64(value),
        ) {
            tracing::warn!(?err, %axis, "failed to write scroll offset");
        }
    }
}

impl ScrollHost for DomHost {
    type Container = DomContainer;

    fn root(&self) -> DomContainer {
        DomContainer::new(self.element.clone())
    }

    fn now_ms(&self) -> f64 {
        match self.window.performance() {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        }
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn set_iframes_blocked(&mut self, blocked: bool) {
        let frames = match self.document.query_selector_all("iframe") {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!(?err, "failed to query iframes");
                return;
            }
        };
        for index in 0..frames.length() {
            let Some(frame) = frames
                .get(index)
                .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            let style = frame.style();
            let result = if blocked {
                style.set_property(POINTER_EVENTS, "none")
            } else {
                style.remove_property(POINTER_EVENTS).map(|_| ())
            };
            if let Err(err) = result {
                tracing::warn!(?err, blocked, "failed to toggle iframe pointer events");
            }
        }
    }

    fn supports_smooth_scroll(&self) -> bool {
        let user_agent = self.window.navigator().user_agent().unwrap_or_default();
        !is_legacy_edge(&user_agent)
    }
}
