pub mod model;
pub mod mapper;
pub mod scene;
pub mod throttle;
pub mod geometry {
    pub mod math;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod hit;
}
mod json;

use std::collections::HashSet;

use serde_json::Value;

use geometry::tolerance::{CLOSE_RADIUS_PX, MIN_POLYGON_VERTICES};
use mapper::SurfaceMap;
use model::{default_polygon, Cursor, Hit, Key, Mode, Vertex, Zone};
use throttle::PublishGate;

/// Quiet period before hover is recomputed after the pointer last moved.
pub const HOVER_DEBOUNCE_MS: f64 = 50.0;

/// What the host must do after an input event. `publish` means "invoke the
/// owner callback with the current zone list now"; `schedule` means a
/// deferred publish or hover recompute is owed and `poll` should be driven
/// on upcoming frame boundaries until it clears.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    pub redraw: bool,
    pub publish: bool,
    pub schedule: bool,
}

impl Outcome {
    fn redraw_only() -> Outcome {
        Outcome { redraw: true, publish: false, schedule: false }
    }
}

/// The zone editor: the authoritative working copy of the zone list plus
/// the ephemeral session state (selection, mode, draft, hover).
///
/// The zone list itself is owned by the application; `set_zones_value`
/// replaces the working copy wholesale and `zones_value` / the `publish`
/// flag on [`Outcome`] carry changes back. All timing is injected through
/// `now_ms` parameters; the editor never reads a clock.
pub struct Editor {
    pub(crate) zones: Vec<Zone>,
    pub(crate) selected_zone: Option<usize>,
    pub(crate) selected_vertex: Option<usize>,
    pub(crate) mode: Mode,
    pub(crate) draft: Vec<Vertex>,
    pub(crate) hover: Option<Hit>,
    pub(crate) pending_hover: Option<(f32, f32, f64)>, // pixel pos + arrival time
    pub(crate) surface: SurfaceMap,
    pub(crate) image: Option<String>,
    pub(crate) disabled: bool,
    pub(crate) gate: PublishGate,
    next_zone_seq: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Editor {
        Editor {
            zones: Vec::new(),
            selected_zone: None,
            selected_vertex: None,
            mode: Mode::Idle,
            draft: Vec::new(),
            hover: None,
            pending_hover: None,
            surface: SurfaceMap::default(),
            image: None,
            disabled: false,
            gate: PublishGate::new(),
            next_zone_seq: 1,
        }
    }

    // Accessors

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn selected_zone(&self) -> Option<usize> {
        self.selected_zone
    }
    pub fn selected_vertex(&self) -> Option<usize> {
        self.selected_vertex
    }
    pub fn hover(&self) -> Option<Hit> {
        self.hover
    }
    pub fn draft(&self) -> &[Vertex] {
        &self.draft
    }
    pub fn surface(&self) -> SurfaceMap {
        self.surface
    }
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Read-only hit test at a pixel position; never touches the store.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<Hit> {
        algorithms::hit::hit_impl(&self.zones, self.selected_zone, &self.surface, px, py)
    }

    pub fn scene(&self) -> scene::Scene {
        scene::scene_impl(self)
    }

    pub fn cursor(&self) -> Cursor {
        scene::cursor_for(self.mode, self.hover, self.disabled)
    }

    /// True while a deferred publish or hover recompute is owed; the host
    /// keeps driving `poll` on frame boundaries until this clears.
    pub fn needs_poll(&self) -> bool {
        self.gate.has_pending() || self.pending_hover.is_some()
    }

    // Owner-side inputs

    /// Replace the working copy from the owner's wire-shape JSON. Returns
    /// the number of zones that needed repair on ingest. Never publishes:
    /// the change came from the owner.
    pub fn set_zones_value(&mut self, v: &Value) -> usize {
        self.set_zone_list(json::zones_from_value(v))
    }

    /// Replace the working copy with an already-typed list, normalizing it
    /// (clamped coordinates, 3-vertex floor via the template shape, unique
    /// non-empty ids). Selection is carried across by zone id.
    pub fn set_zone_list(&mut self, mut zones: Vec<Zone>) -> usize {
        let keep_id = self
            .selected_zone
            .and_then(|i| self.zones.get(i))
            .map(|z| z.id.clone());
        let repaired = normalize_zones(&mut zones, &mut self.next_zone_seq);
        self.zones = zones;
        self.selected_zone = keep_id.and_then(|id| self.zones.iter().position(|z| z.id == id));
        self.selected_vertex = match (self.selected_zone, self.selected_vertex) {
            (Some(zi), Some(vi)) if vi < self.zones[zi].polygon.len() => Some(vi),
            _ => None,
        };
        // Indices in hover and any in-flight drag are stale now.
        self.hover = None;
        self.pending_hover = None;
        if matches!(self.mode, Mode::DraggingVertex { .. }) {
            self.mode = Mode::Idle;
            self.gate.cancel();
        }
        repaired
    }

    /// The working copy in wire shape, ready for the owner callback.
    pub fn zones_value(&self) -> Value {
        json::zones_to_value(&self.zones)
    }

    pub fn set_surface_size(&mut self, width: f32, height: f32) -> Outcome {
        let map = SurfaceMap::new(width, height);
        if map == self.surface {
            return Outcome::default();
        }
        self.surface = map;
        self.with_schedule(Outcome::redraw_only())
    }

    /// Swap the background frame locator. The host only calls this once a
    /// load succeeded, so a failed load simply leaves the prior image up.
    pub fn set_image(&mut self, locator: Option<String>) -> Outcome {
        let locator = locator.filter(|s| !s.trim().is_empty());
        if locator == self.image {
            return Outcome::default();
        }
        self.image = locator;
        self.with_schedule(Outcome::redraw_only())
    }

    /// Freeze or thaw all mutation paths. Display stays live. An in-flight
    /// drag ends with its final unconditional publish.
    pub fn set_disabled(&mut self, disabled: bool) -> Outcome {
        if self.disabled == disabled {
            return Outcome::default();
        }
        self.disabled = disabled;
        let mut out = Outcome::redraw_only();
        if disabled {
            if matches!(self.mode, Mode::DraggingVertex { .. }) {
                self.mode = Mode::Idle;
                self.gate.flush();
                out.publish = true;
            }
            self.pending_hover = None;
            self.hover = None;
        }
        self.with_schedule(out)
    }

    /// Companion-panel selection. Refused (false) for an out-of-range index
    /// or while a drag is in flight.
    pub fn select_zone(&mut self, index: Option<usize>) -> bool {
        if matches!(self.mode, Mode::DraggingVertex { .. }) {
            return false;
        }
        let index = match index {
            Some(i) if i < self.zones.len() => Some(i),
            Some(_) => return false,
            None => None,
        };
        if self.selected_zone != index {
            self.selected_zone = index;
            self.selected_vertex = None;
        }
        true
    }

    /// Companion-panel field edit: merge anchors/classes/threshold into a
    /// zone. A real change is a committable edit and publishes immediately.
    pub fn update_zone_meta(&mut self, index: usize, patch: &Value) -> Outcome {
        if self.disabled {
            return Outcome::default();
        }
        let changed = match self.zones.get_mut(index) {
            Some(zone) => json::apply_meta_patch(zone, patch),
            None => false,
        };
        if changed {
            let out = self.commit();
            self.with_schedule(out)
        } else {
            Outcome::default()
        }
    }

    // Drawing control

    pub fn begin_drawing(&mut self) -> Outcome {
        if self.disabled || self.mode != Mode::Idle {
            return Outcome::default();
        }
        // Entering Drawing always starts from an empty draft.
        self.draft.clear();
        self.mode = Mode::Drawing;
        self.with_schedule(Outcome::redraw_only())
    }

    pub fn cancel_drawing(&mut self) -> Outcome {
        if self.mode != Mode::Drawing {
            return Outcome::default();
        }
        self.draft.clear();
        self.mode = Mode::Idle;
        self.with_schedule(Outcome::redraw_only())
    }

    /// The explicit "Complete" action: commits the draft without requiring
    /// a closing click. Under three points this is a no-op and the draw
    /// continues.
    pub fn complete_drawing(&mut self) -> Outcome {
        if self.disabled || self.mode != Mode::Drawing {
            return Outcome::default();
        }
        let out = self.complete_draft();
        self.with_schedule(out)
    }

    // Pointer events

    pub fn pointer_down(&mut self, px: f32, py: f32) -> Outcome {
        if self.disabled {
            return Outcome::default();
        }
        let out = match self.mode {
            Mode::Drawing => {
                if let Some(first) = self.draft.first().copied() {
                    if self.draft.len() >= MIN_POLYGON_VERTICES {
                        let (fx, fy) = self.surface.to_px(first.x, first.y);
                        let dx = fx - px;
                        let dy = fy - py;
                        if dx * dx + dy * dy <= CLOSE_RADIUS_PX * CLOSE_RADIUS_PX {
                            let out = self.complete_draft();
                            return self.with_schedule(out);
                        }
                    }
                }
                let (nx, ny) = self.surface.to_norm(px, py);
                self.draft.push(Vertex { x: nx, y: ny });
                Outcome::redraw_only()
            }
            // Drags are exclusive; a second button mid-drag changes nothing.
            Mode::DraggingVertex { .. } => Outcome::default(),
            Mode::Idle => match self.hit_test(px, py) {
                Some(hit @ Hit::Vertex { zone, vertex, .. }) => {
                    self.selected_zone = Some(zone);
                    self.selected_vertex = Some(vertex);
                    self.mode = Mode::DraggingVertex { zone, vertex };
                    self.hover = Some(hit);
                    Outcome::redraw_only()
                }
                Some(Hit::Edge { zone, edge, .. }) => {
                    let (nx, ny) = self.surface.to_norm(px, py);
                    let at;
                    {
                        let z = &mut self.zones[zone];
                        at = (edge + 1).min(z.polygon.len());
                        z.polygon.insert(at, Vertex { x: nx, y: ny });
                    }
                    self.selected_zone = Some(zone);
                    self.selected_vertex = Some(at);
                    self.hover = Some(Hit::Vertex { zone, vertex: at, dist: 0.0 });
                    self.commit()
                }
                Some(Hit::Body { zone }) => {
                    self.selected_zone = Some(zone);
                    self.selected_vertex = None;
                    Outcome::redraw_only()
                }
                None => {
                    if self.selected_zone.take().is_some() | self.selected_vertex.take().is_some() {
                        Outcome::redraw_only()
                    } else {
                        Outcome::default()
                    }
                }
            },
        };
        self.with_schedule(out)
    }

    pub fn pointer_move(&mut self, px: f32, py: f32, now_ms: f64) -> Outcome {
        if self.disabled {
            return Outcome::default();
        }
        let out = match self.mode {
            Mode::DraggingVertex { zone, vertex } => {
                let (nx, ny) = self.surface.to_norm(px, py);
                if let Some(v) = self.zones.get_mut(zone).and_then(|z| z.polygon.get_mut(vertex)) {
                    *v = Vertex { x: nx, y: ny };
                }
                // The working copy is current; the owner hears about it on
                // the gate's cadence.
                self.gate.mark();
                Outcome { redraw: true, publish: false, schedule: true }
            }
            _ => {
                self.pending_hover = Some((px, py, now_ms));
                Outcome { redraw: false, publish: false, schedule: true }
            }
        };
        self.with_schedule(out)
    }

    pub fn pointer_up(&mut self) -> Outcome {
        let out = self.end_drag();
        self.with_schedule(out)
    }

    /// Leaving the surface ends any drag and any hover.
    pub fn pointer_leave(&mut self) -> Outcome {
        let mut out = self.end_drag();
        self.pending_hover = None;
        if self.hover.take().is_some() {
            out.redraw = true;
        }
        self.with_schedule(out)
    }

    // Keyboard

    pub fn key_down(&mut self, key: Key) -> Outcome {
        // Drags are exclusive: keys wait until the pointer is released.
        if self.disabled || matches!(self.mode, Mode::DraggingVertex { .. }) {
            return Outcome::default();
        }
        let out = match key {
            Key::Escape => {
                if self.mode == Mode::Drawing {
                    self.draft.clear();
                    self.mode = Mode::Idle;
                    Outcome::redraw_only()
                } else if self.selected_zone.is_some() || self.selected_vertex.is_some() {
                    self.selected_zone = None;
                    self.selected_vertex = None;
                    Outcome::redraw_only()
                } else {
                    Outcome::default()
                }
            }
            Key::Enter => {
                if self.mode == Mode::Drawing {
                    self.complete_draft()
                } else {
                    Outcome::default()
                }
            }
            Key::Delete | Key::Backspace => {
                if self.mode == Mode::Drawing {
                    Outcome::default()
                } else {
                    self.delete_selection()
                }
            }
            Key::Tab => {
                if self.mode == Mode::Drawing || self.zones.is_empty() {
                    Outcome::default()
                } else {
                    let next = match self.selected_zone {
                        Some(i) => (i + 1) % self.zones.len(),
                        None => 0,
                    };
                    self.selected_zone = Some(next);
                    self.selected_vertex = None;
                    Outcome::redraw_only()
                }
            }
        };
        self.with_schedule(out)
    }

    // Frame-boundary driver

    /// Service deferred work: the throttled publish and the debounced hover
    /// recompute. Driven by the host on frame boundaries while
    /// `needs_poll()` holds.
    pub fn poll(&mut self, now_ms: f64) -> Outcome {
        let mut out = Outcome::default();
        if self.gate.poll(now_ms) {
            out.publish = true;
        }
        if let Some((px, py, at)) = self.pending_hover {
            if now_ms - at >= HOVER_DEBOUNCE_MS {
                self.pending_hover = None;
                let hit = self.hit_test(px, py);
                if hit != self.hover {
                    self.hover = hit;
                    out.redraw = true;
                }
            }
        }
        self.with_schedule(out)
    }

    // Internal

    fn with_schedule(&self, mut out: Outcome) -> Outcome {
        out.schedule = out.schedule || self.needs_poll();
        out
    }

    /// Discrete committable change: publish now, window reset.
    fn commit(&mut self) -> Outcome {
        self.gate.flush();
        Outcome { redraw: true, publish: true, schedule: false }
    }

    fn end_drag(&mut self) -> Outcome {
        if matches!(self.mode, Mode::DraggingVertex { .. }) {
            self.mode = Mode::Idle;
            // Final flush is unconditional so the owner is never left stale.
            self.gate.flush();
            Outcome { redraw: true, publish: true, schedule: false }
        } else {
            Outcome::default()
        }
    }

    fn complete_draft(&mut self) -> Outcome {
        if self.draft.len() < MIN_POLYGON_VERTICES {
            return Outcome::default();
        }
        let id = self.alloc_zone_id();
        let polygon = std::mem::take(&mut self.draft);
        self.zones.push(Zone::new(id, polygon));
        self.mode = Mode::Idle;
        self.selected_zone = Some(self.zones.len() - 1);
        self.selected_vertex = None;
        self.commit()
    }

    fn delete_selection(&mut self) -> Outcome {
        match (self.selected_zone, self.selected_vertex) {
            (Some(zi), Some(vi)) => {
                {
                    let Some(z) = self.zones.get_mut(zi) else {
                        return Outcome::default();
                    };
                    // A polygon never degenerates below a triangle; refusal
                    // is silent, not an error.
                    if z.polygon.len() <= MIN_POLYGON_VERTICES || vi >= z.polygon.len() {
                        return Outcome::default();
                    }
                    z.polygon.remove(vi);
                }
                self.selected_vertex = None;
                self.hover = None;
                self.commit()
            }
            (Some(zi), None) => {
                if zi >= self.zones.len() {
                    return Outcome::default();
                }
                self.zones.remove(zi);
                self.selected_zone = None;
                self.selected_vertex = None;
                self.hover = None;
                self.commit()
            }
            _ => Outcome::default(),
        }
    }

    fn alloc_zone_id(&mut self) -> String {
        let taken: HashSet<&str> = self.zones.iter().map(|z| z.id.as_str()).collect();
        loop {
            let candidate = format!("zone-{}", self.next_zone_seq);
            self.next_zone_seq += 1;
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }
}

/// Ingest normalization: clamp every vertex, replace degenerate polygons
/// with the template shape, and make every id non-empty and unique.
/// Returns how many zones needed repair.
fn normalize_zones(zones: &mut [Zone], next_seq: &mut u64) -> usize {
    let taken: HashSet<String> = zones
        .iter()
        .filter(|z| !z.id.trim().is_empty())
        .map(|z| z.id.trim().to_string())
        .collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut repaired = 0;
    for z in zones.iter_mut() {
        let mut fixed = false;
        if z.polygon.len() < MIN_POLYGON_VERTICES {
            z.polygon = default_polygon();
            fixed = true;
        }
        for v in z.polygon.iter_mut() {
            let c = Vertex::clamped(v.x, v.y);
            if c != *v {
                *v = c;
                fixed = true;
            }
        }
        let needs_generated = {
            let t = z.id.trim();
            t.is_empty() || seen.contains(t)
        };
        if needs_generated {
            loop {
                let candidate = format!("zone-{}", *next_seq);
                *next_seq += 1;
                if !taken.contains(&candidate) && !seen.contains(&candidate) {
                    z.id = candidate;
                    break;
                }
            }
            fixed = true;
        } else if z.id.trim().len() != z.id.len() {
            z.id = z.id.trim().to_string();
            fixed = true;
        }
        seen.insert(z.id.clone());
        if fixed {
            repaired += 1;
        }
    }
    repaired
}
