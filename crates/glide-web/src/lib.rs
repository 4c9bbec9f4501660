pub mod dom;
pub mod listener;
pub mod scroller;

pub use dom::{DomContainer, DomHost};
pub use scroller::GlideScroller;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}
