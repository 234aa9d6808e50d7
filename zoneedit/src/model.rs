use serde::{Deserialize, Serialize};

use crate::geometry::tolerance::clamp01;

/// A polygon corner in normalized [0,1] space, relative to the background
/// image's width/height. Always clamped on write.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

impl Vertex {
    /// Clamp to [0,1]; non-finite components collapse to 0.0.
    pub fn clamped(x: f32, y: f32) -> Vertex {
        Vertex {
            x: if x.is_finite() { clamp01(x) } else { 0.0 },
            y: if y.is_finite() { clamp01(y) } else { 0.0 },
        }
    }
}

/// A zone as exchanged with the owning application. Anchors, classes,
/// threshold and counters are pass-through; the counters are read-only
/// telemetry and never written by the editor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub polygon: Vec<Vertex>,
    #[serde(default)]
    pub triggering_anchors: Vec<String>,
    #[serde(default)]
    pub triggering_classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_crossing_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_count: Option<u64>,
}

impl Zone {
    pub fn new(id: String, polygon: Vec<Vertex>) -> Zone {
        Zone {
            id,
            polygon,
            triggering_anchors: Vec::new(),
            triggering_classes: Vec::new(),
            min_crossing_threshold: None,
            in_count: None,
            out_count: None,
            current_count: None,
        }
    }
}

/// Replacement shape for polygons that arrive with fewer than three usable
/// vertices: a centered square, immediately visible and editable.
pub fn default_polygon() -> Vec<Vertex> {
    vec![
        Vertex { x: 0.35, y: 0.35 },
        Vertex { x: 0.65, y: 0.35 },
        Vertex { x: 0.65, y: 0.65 },
        Vertex { x: 0.35, y: 0.65 },
    ]
}

/// Result of hit-testing a pixel position against the zone list.
/// Edge `i` runs from vertex `i` to vertex `(i+1) % n`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Hit {
    #[serde(rename = "vertex")]
    Vertex { zone: usize, vertex: usize, dist: f32 },
    #[serde(rename = "edge")]
    Edge { zone: usize, edge: usize, t: f32, dist: f32 },
    #[serde(rename = "body")]
    Body { zone: usize },
}

impl Hit {
    pub fn zone(&self) -> usize {
        match *self {
            Hit::Vertex { zone, .. } | Hit::Edge { zone, .. } | Hit::Body { zone } => zone,
        }
    }
}

/// Interaction state. Hover is an orthogonal observation, not a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Drawing,
    DraggingVertex { zone: usize, vertex: usize },
}

/// Pointer cursor the host should show over the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    Default,
    Crosshair,
    Move,
    Pointer,
}

impl Cursor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Crosshair => "crosshair",
            Cursor::Move => "move",
            Cursor::Pointer => "pointer",
        }
    }
}

/// Keyboard shortcuts the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Tab,
    Enter,
}

impl Key {
    /// Map DOM `KeyboardEvent.key` names (plus legacy aliases).
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "Delete" | "Del" => Some(Key::Delete),
            "Backspace" => Some(Key::Backspace),
            "Escape" | "Esc" => Some(Key::Escape),
            "Tab" => Some(Key::Tab),
            "Enter" => Some(Key::Enter),
            _ => None,
        }
    }
}
