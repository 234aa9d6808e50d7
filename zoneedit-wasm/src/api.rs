use crate::error;
use crate::{Host, ZoneEditor};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use zoneedit::model::{Hit, Key, Mode};
use zoneedit::Outcome;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

type FrameHolder = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Invoke the owner's change callback with the current zone list. Borrows
/// are released before calling out: the callback may reenter the editor.
pub(crate) fn fire_change(host: &Rc<RefCell<Host>>) {
    let (cb, payload) = {
        let h = host.borrow();
        if h.disposed {
            return;
        }
        let Some(cb) = h.on_change.clone() else { return };
        let payload = serde_wasm_bindgen::to_value(h.editor.zones()).unwrap_or(JsValue::NULL);
        (cb, payload)
    };
    let _ = cb.call1(&JsValue::NULL, &payload);
}

/// Frame-driven state changes (hover, deferred publish) cannot return a
/// redraw flag to anyone, so they notify through the redraw callback.
pub(crate) fn fire_redraw(host: &Rc<RefCell<Host>>) {
    let cb = {
        let h = host.borrow();
        if h.disposed {
            return;
        }
        match h.on_redraw.clone() {
            Some(cb) => cb,
            None => return,
        }
    };
    let _ = cb.call0(&JsValue::NULL);
}

/// At most one animation frame is ever pending; deferred publishes land on
/// a render boundary.
pub(crate) fn schedule_frame(host: &Rc<RefCell<Host>>, holder: &FrameHolder) {
    let mut h = host.borrow_mut();
    if h.disposed || h.frame.is_some() {
        return;
    }
    let Some(win) = web_sys::window() else { return };
    if let Some(cb) = holder.borrow().as_ref() {
        if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
            h.frame = Some(id);
        }
    }
}

impl ZoneEditor {
    fn apply(&self, out: Outcome) -> bool {
        if out.publish {
            fire_change(&self.host);
        }
        if out.schedule {
            schedule_frame(&self.host, &self.frame_cb);
        }
        out.redraw
    }

    fn ingest(&self, v: JsValue) -> Result<usize, JsValue> {
        let val: serde_json::Value = serde_wasm_bindgen::from_value(v)
            .map_err(|e| error::err("json_parse", format!("{}", e), None))?;
        let repaired = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return Ok(0);
            }
            h.editor.set_zones_value(&val)
        };
        if repaired > 0 {
            web_sys::console::warn_1(
                &format!("zoneedit: repaired {} zone(s) on ingest", repaired).into(),
            );
        }
        Ok(repaired)
    }
}

#[wasm_bindgen]
impl ZoneEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ZoneEditor {
        let host = Rc::new(RefCell::new(Host {
            editor: zoneedit::Editor::new(),
            on_change: None,
            on_redraw: None,
            available_classes: Vec::new(),
            frame: None,
            disposed: false,
        }));
        let holder: FrameHolder = Rc::new(RefCell::new(None));
        {
            let host = host.clone();
            let holder2 = holder.clone();
            let cb = Closure::wrap(Box::new(move |_ts: f64| {
                let out = {
                    let mut h = host.borrow_mut();
                    h.frame = None;
                    if h.disposed {
                        return;
                    }
                    h.editor.poll(js_sys::Date::now())
                };
                if out.publish {
                    fire_change(&host);
                }
                if out.redraw {
                    fire_redraw(&host);
                }
                if out.schedule {
                    schedule_frame(&host, &holder2);
                }
            }) as Box<dyn FnMut(f64)>);
            *holder.borrow_mut() = Some(cb);
        }
        ZoneEditor { host, frame_cb: holder }
    }

    // Owner-side inputs

    pub fn set_zones(&self, v: JsValue) -> bool {
        self.ingest(v).is_ok()
    }

    pub fn set_zones_res(&self, v: JsValue) -> JsValue {
        match self.ingest(v) {
            Ok(repaired) => error::ok(JsValue::from_f64(repaired as f64)),
            Err(e) => e,
        }
    }

    /// Current zone list in wire shape.
    pub fn zones(&self) -> JsValue {
        let h = self.host.borrow();
        serde_wasm_bindgen::to_value(h.editor.zones()).unwrap_or(JsValue::NULL)
    }

    pub fn zone_count(&self) -> u32 {
        self.host.borrow().editor.zones().len() as u32
    }

    pub fn set_on_change(&self, cb: &js_sys::Function) {
        self.host.borrow_mut().on_change = Some(cb.clone());
    }

    pub fn clear_on_change(&self) {
        self.host.borrow_mut().on_change = None;
    }

    pub fn set_on_redraw(&self, cb: &js_sys::Function) {
        self.host.borrow_mut().on_redraw = Some(cb.clone());
    }

    pub fn set_surface_size(&self, width: f32, height: f32) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.set_surface_size(width, height)
        };
        self.apply(out)
    }

    pub fn set_surface_size_res(&self, width: f32, height: f32) -> JsValue {
        if !width.is_finite() {
            return error::non_finite("width");
        }
        if !height.is_finite() {
            return error::non_finite("height");
        }
        if width < 0.0 {
            return error::out_of_range("width", 0.0, f32::INFINITY, width);
        }
        if height < 0.0 {
            return error::out_of_range("height", 0.0, f32::INFINITY, height);
        }
        error::ok(JsValue::from_bool(self.set_surface_size(width, height)))
    }

    /// Point the background at a newly loaded frame. On load failure the
    /// host simply never calls this, leaving the previous frame in place.
    pub fn set_image(&self, locator: &str) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.set_image(Some(locator.to_string()))
        };
        self.apply(out)
    }

    pub fn clear_image(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.set_image(None)
        };
        self.apply(out)
    }

    pub fn set_disabled(&self, disabled: bool) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.set_disabled(disabled)
        };
        self.apply(out)
    }

    pub fn disabled(&self) -> bool {
        self.host.borrow().editor.disabled()
    }

    /// Class names for the companion panel's `triggering_classes` picker;
    /// pass-through only.
    pub fn set_available_classes(&self, v: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<Vec<String>>(v) {
            Ok(classes) => {
                self.host.borrow_mut().available_classes = classes;
                true
            }
            Err(_) => false,
        }
    }

    pub fn available_classes(&self) -> JsValue {
        let h = self.host.borrow();
        serde_wasm_bindgen::to_value(&h.available_classes).unwrap_or(JsValue::NULL)
    }

    // Drawing control

    pub fn begin_drawing(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.begin_drawing()
        };
        self.apply(out)
    }

    pub fn cancel_drawing(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.cancel_drawing()
        };
        self.apply(out)
    }

    /// Returns whether a zone was actually created.
    pub fn complete_drawing(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.complete_drawing()
        };
        let created = out.publish;
        self.apply(out);
        created
    }

    // Pointer and keyboard events

    pub fn pointer_down(&self, x: f32, y: f32) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.pointer_down(x, y)
        };
        self.apply(out)
    }

    pub fn pointer_down_res(&self, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        error::ok(JsValue::from_bool(self.pointer_down(x, y)))
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.pointer_move(x, y, js_sys::Date::now())
        };
        self.apply(out)
    }

    pub fn pointer_move_res(&self, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        error::ok(JsValue::from_bool(self.pointer_move(x, y)))
    }

    pub fn pointer_up(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.pointer_up()
        };
        self.apply(out)
    }

    pub fn pointer_leave(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.pointer_leave()
        };
        self.apply(out)
    }

    /// Feed a `KeyboardEvent.key` name. Returns whether the editor consumed
    /// it (the host should then preventDefault). The host scopes the
    /// listener to "editor mounted and focus not inside a text input".
    pub fn key_down(&self, key: &str) -> bool {
        let Some(key) = Key::from_name(key) else { return false };
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.key_down(key)
        };
        let consumed = out.redraw || out.publish;
        self.apply(out);
        consumed
    }

    /// Manual tick for hosts that drive their own frame loop.
    pub fn poll(&self) -> bool {
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.poll(js_sys::Date::now())
        };
        if out.publish {
            fire_change(&self.host);
        }
        if out.schedule {
            schedule_frame(&self.host, &self.frame_cb);
        }
        out.redraw
    }

    // Selection and metadata (companion panel)

    pub fn select_zone(&self, index: i32) -> bool {
        let mut h = self.host.borrow_mut();
        if h.disposed {
            return false;
        }
        let index = if index < 0 { None } else { Some(index as usize) };
        h.editor.select_zone(index)
    }

    pub fn selected_zone(&self) -> i32 {
        self.host.borrow().editor.selected_zone().map_or(-1, |i| i as i32)
    }

    pub fn selected_vertex(&self) -> i32 {
        self.host.borrow().editor.selected_vertex().map_or(-1, |i| i as i32)
    }

    pub fn update_zone_meta(&self, index: u32, patch: JsValue) -> bool {
        let Ok(patch) = serde_wasm_bindgen::from_value::<serde_json::Value>(patch) else {
            return false;
        };
        let out = {
            let mut h = self.host.borrow_mut();
            if h.disposed {
                return false;
            }
            h.editor.update_zone_meta(index as usize, &patch)
        };
        self.apply(out)
    }

    pub fn update_zone_meta_res(&self, index: u32, patch: JsValue) -> JsValue {
        if (index as usize) >= self.host.borrow().editor.zones().len() {
            return error::invalid_index("zone", index);
        }
        match serde_wasm_bindgen::from_value::<serde_json::Value>(patch) {
            Ok(patch) => {
                let out = {
                    let mut h = self.host.borrow_mut();
                    if h.disposed {
                        return error::ok(JsValue::from_bool(false));
                    }
                    h.editor.update_zone_meta(index as usize, &patch)
                };
                error::ok(JsValue::from_bool(self.apply(out)))
            }
            Err(e) => error::err("json_parse", format!("{}", e), None),
        }
    }

    // Read-only views

    pub fn mode(&self) -> String {
        match self.host.borrow().editor.mode() {
            Mode::Idle => "idle",
            Mode::Drawing => "drawing",
            Mode::DraggingVertex { .. } => "dragging",
        }
        .to_string()
    }

    pub fn cursor(&self) -> String {
        self.host.borrow().editor.cursor().as_str().to_string()
    }

    /// Display list for the host canvas, back-to-front.
    pub fn scene(&self) -> JsValue {
        let h = self.host.borrow();
        serde_wasm_bindgen::to_value(&h.editor.scene()).unwrap_or(JsValue::NULL)
    }

    /// Flattened `[x0, y0, x1, y1, ...]` pixel ring for one zone; a fast
    /// path for hosts that stroke paths directly.
    pub fn polygon_px(&self, index: u32) -> JsValue {
        let h = self.host.borrow();
        let Some(zone) = h.editor.zones().get(index as usize) else {
            return JsValue::NULL;
        };
        let map = h.editor.surface();
        let mut flat = Vec::with_capacity(zone.polygon.len() * 2);
        for v in &zone.polygon {
            let (px, py) = map.to_px(v.x, v.y);
            flat.push(px);
            flat.push(py);
        }
        crate::interop::arr_f32(&flat).into()
    }

    pub fn hit_test(&self, x: f32, y: f32) -> JsValue {
        let h = self.host.borrow();
        if let Some(hit) = h.editor.hit_test(x, y) {
            let obj = crate::interop::new_obj();
            match hit {
                Hit::Vertex { zone, vertex, dist } => {
                    crate::interop::set_kv(&obj, "kind", &JsValue::from_str("vertex"));
                    crate::interop::set_kv(&obj, "zone", &JsValue::from_f64(zone as f64));
                    crate::interop::set_kv(&obj, "vertex", &JsValue::from_f64(vertex as f64));
                    crate::interop::set_kv(&obj, "dist", &JsValue::from_f64(dist as f64));
                }
                Hit::Edge { zone, edge, t, dist } => {
                    crate::interop::set_kv(&obj, "kind", &JsValue::from_str("edge"));
                    crate::interop::set_kv(&obj, "zone", &JsValue::from_f64(zone as f64));
                    crate::interop::set_kv(&obj, "edge", &JsValue::from_f64(edge as f64));
                    crate::interop::set_kv(&obj, "t", &JsValue::from_f64(t as f64));
                    crate::interop::set_kv(&obj, "dist", &JsValue::from_f64(dist as f64));
                }
                Hit::Body { zone } => {
                    crate::interop::set_kv(&obj, "kind", &JsValue::from_str("body"));
                    crate::interop::set_kv(&obj, "zone", &JsValue::from_f64(zone as f64));
                }
            }
            obj.into()
        } else {
            JsValue::NULL
        }
    }

    /// Teardown: cancel the pending frame, drop callbacks, and make every
    /// further call a no-op. Nothing can mutate state after this.
    pub fn dispose(&self) {
        {
            let mut h = self.host.borrow_mut();
            h.disposed = true;
            h.on_change = None;
            h.on_redraw = None;
            if let Some(id) = h.frame.take() {
                if let Some(win) = web_sys::window() {
                    let _ = win.cancel_animation_frame(id);
                }
            }
        }
        // Break the closure <-> holder cycle.
        *self.frame_cb.borrow_mut() = None;
    }
}
