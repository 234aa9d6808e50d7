use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

mod api;
mod error;
mod interop;

pub(crate) struct Host {
    pub(crate) editor: zoneedit::Editor,
    pub(crate) on_change: Option<js_sys::Function>,
    pub(crate) on_redraw: Option<js_sys::Function>,
    pub(crate) available_classes: Vec<String>,
    pub(crate) frame: Option<i32>,
    pub(crate) disposed: bool,
}

/// JS-facing wrapper around the core editor. Shared behind `Rc<RefCell>`
/// so the animation-frame deferral can reach it after the call that
/// scheduled it has returned.
#[wasm_bindgen]
pub struct ZoneEditor {
    pub(crate) host: Rc<RefCell<Host>>,
    pub(crate) frame_cb: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}
