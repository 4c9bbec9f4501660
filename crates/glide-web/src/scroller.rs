//! `GlideScroller`: the JavaScript-facing smooth scroller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, WheelEvent};

use glide_core::{Direction, ScrollerConfig, SmoothScroller};

use crate::dom::{self, DomContainer, DomHost};
use crate::listener::EventListener;

struct Inner {
    scroller: SmoothScroller<DomHost>,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
    pending_frame: Option<i32>,
}

impl Inner {
    /// Hand a frame request from the scroller to `requestAnimationFrame`.
    fn schedule(&mut self) {
        if !self.scroller.host_mut().take_frame_request() || self.pending_frame.is_some() {
            return;
        }
        let Some(callback) = &self.frame_callback else {
            return;
        };
        let requested = self
            .scroller
            .host()
            .window()
            .request_animation_frame(callback.as_ref().unchecked_ref());
        match requested {
            Ok(id) => self.pending_frame = Some(id),
            Err(err) => tracing::warn!(?err, "requestAnimationFrame failed"),
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            if let Err(err) = self.scroller.host().window().cancel_animation_frame(id) {
                tracing::warn!(?err, "cancelAnimationFrame failed");
            }
        }
    }
}

fn frame_callback(weak: Weak<RefCell<Inner>>) -> Closure<dyn FnMut(f64)> {
    Closure::wrap(Box::new(move |_timestamp: f64| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        inner.pending_frame = None;
        inner.scroller.on_frame();
        inner.schedule();
    }) as Box<dyn FnMut(f64)>)
}

fn on_wheel(weak: Weak<RefCell<Inner>>) -> impl FnMut(web_sys::Event) {
    move |event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.try_borrow_mut() else {
            return;
        };
        let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
            return;
        };

        let target = event
            .target()
            .and_then(|target| target.dyn_into::<Element>().ok())
            .map(DomContainer::new);
        let outcome = inner.scroller.handle_wheel(&dom::wheel_input(wheel), target);
        if outcome.suppresses_default() {
            event.prevent_default();
        }
        inner.schedule();
    }
}

fn on_scroll(weak: Weak<RefCell<Inner>>) -> impl FnMut(web_sys::Event) {
    move |_event| {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        if let Ok(mut inner) = inner.try_borrow_mut() {
            inner.scroller.handle_scroll();
        };
    }
}

/// Momentum smooth scrolling for a document or a scrollable element.
///
/// ```js
/// const scroller = new GlideScroller(document, "y");
/// scroller.friction = 8;
/// // later
/// scroller.destroy();
/// ```
#[wasm_bindgen]
pub struct GlideScroller {
    inner: Rc<RefCell<Inner>>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl GlideScroller {
    /// `target` is a `Document` (the whole page) or an `HTMLElement`;
    /// `direction` is `"x"`, `"y"` (default) or `"xy"`.
    #[wasm_bindgen(constructor)]
    pub fn new(target: JsValue, direction: Option<String>) -> Result<GlideScroller, JsValue> {
        let direction = match direction.as_deref() {
            Some(value) => value
                .parse::<Direction>()
                .map_err(|err| JsValue::from_str(&err.to_string()))?,
            None => Direction::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;

        let host = if target.is_instance_of::<Document>() {
            DomHost::for_document(window, document)?
        } else if let Ok(element) = target.dyn_into::<HtmlElement>() {
            DomHost::for_element(window, document, element)
        } else {
            return Err(JsValue::from_str("target must be a Document or an HTMLElement"));
        };

        let event_target = host.event_target();
        let scroller = SmoothScroller::new(host, ScrollerConfig::with_direction(direction));
        let active = scroller.is_active();

        let inner = Rc::new(RefCell::new(Inner {
            scroller,
            frame_callback: None,
            pending_frame: None,
        }));
        if !active {
            return Ok(Self {
                inner,
                listeners: Vec::new(),
            });
        }

        inner.borrow_mut().frame_callback = Some(frame_callback(Rc::downgrade(&inner)));
        let listeners = vec![
            EventListener::new(&event_target, "wheel", false, on_wheel(Rc::downgrade(&inner)))?,
            EventListener::new(&event_target, "scroll", true, on_scroll(Rc::downgrade(&inner)))?,
        ];

        Ok(Self { inner, listeners })
    }

    /// Detach listeners, stop any animation and release iframes.
    /// Calling it again does nothing.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.cancel_frame();
            inner.scroller.destroy();
        }
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner.borrow().scroller.is_active()
    }

    #[wasm_bindgen(js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.inner.borrow().scroller.is_animating()
    }

    #[wasm_bindgen(getter)]
    pub fn direction(&self) -> String {
        self.inner.borrow().scroller.config().direction.to_string()
    }

    /// Switch between `"x"`, `"y"` and `"xy"`; takes effect on the next event.
    #[wasm_bindgen(js_name = setDirection)]
    pub fn set_direction(&mut self, direction: &str) -> Result<(), JsValue> {
        let direction = direction
            .parse::<Direction>()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        self.inner.borrow_mut().scroller.set_direction(direction);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn velocity(&self) -> f64 {
        self.inner.borrow().scroller.config().velocity
    }

    #[wasm_bindgen(setter)]
    pub fn set_velocity(&mut self, velocity: f64) {
        self.inner.borrow_mut().scroller.config_mut().velocity = velocity;
    }

    #[wasm_bindgen(getter)]
    pub fn friction(&self) -> f64 {
        self.inner.borrow().scroller.config().friction
    }

    #[wasm_bindgen(setter)]
    pub fn set_friction(&mut self, friction: f64) {
        self.inner.borrow_mut().scroller.config_mut().friction = friction;
    }

    #[wasm_bindgen(getter = wheelDeltaScale)]
    pub fn wheel_delta_scale(&self) -> f64 {
        self.inner.borrow().scroller.config().wheel_delta_scale
    }

    #[wasm_bindgen(setter = wheelDeltaScale)]
    pub fn set_wheel_delta_scale(&mut self, scale: f64) {
        self.inner.borrow_mut().scroller.config_mut().wheel_delta_scale = scale;
    }

    #[wasm_bindgen(getter = disableIframes)]
    pub fn disable_iframes(&self) -> bool {
        self.inner.borrow().scroller.config().disable_iframes
    }

    #[wasm_bindgen(setter = disableIframes)]
    pub fn set_disable_iframes(&mut self, disable: bool) {
        self.inner.borrow_mut().scroller.config_mut().disable_iframes = disable;
    }
}

impl Drop for GlideScroller {
    fn drop(&mut self) {
        self.destroy();
    }
}
