use serde::Serialize;

use crate::algorithms::hit::pixel_ring;
use crate::geometry::math::centroid;
use crate::geometry::tolerance::MIN_POLYGON_VERTICES;
use crate::model::{Cursor, Hit, Mode};
use crate::Editor;

pub const CAPTION_START: &str = "Click to start";
pub const CAPTION_NEED_MORE: &str = "Click to add more points (minimum 3)";
pub const CAPTION_CLOSE: &str = "Click the first point or use Complete to finish";
pub const PLACEHOLDER_NO_IMAGE: &str = "No camera frame available";

/// Paint emphasis. `Back` zones are context at reduced opacity; the single
/// `Front` zone is the one being edited and paints above all siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Back,
    Front,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScenePoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SceneHandle {
    pub x: f32,
    pub y: f32,
    pub halo: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SceneZone {
    /// Index into the editor's zone list, not paint order.
    pub zone: usize,
    pub id: String,
    /// Closed ring in surface pixel space.
    pub points: Vec<ScenePoint>,
    /// Anchor for the id label.
    pub label: ScenePoint,
    pub emphasis: Emphasis,
    /// Empty unless the zone is selected or hovered.
    pub handles: Vec<SceneHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_count: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SceneDraft {
    pub points: Vec<ScenePoint>,
    /// Open path until three points exist.
    pub closed: bool,
    pub caption: &'static str,
}

/// Display list for the host canvas, ordered back-to-front: background
/// image (or placeholder), `zones` in paint order, then `draft`.
#[derive(Clone, Debug, Serialize)]
pub struct Scene {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    pub zones: Vec<SceneZone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<SceneDraft>,
    pub cursor: Cursor,
}

pub(crate) fn scene_impl(ed: &Editor) -> Scene {
    let cursor = cursor_for(ed.mode, ed.hover, ed.disabled);
    // No frame, no geometry: the placeholder message stands in for it all.
    let Some(image) = ed.image.clone() else {
        return Scene {
            image: None,
            placeholder: Some(PLACEHOLDER_NO_IMAGE),
            zones: Vec::new(),
            draft: None,
            cursor,
        };
    };

    let mut zones = Vec::with_capacity(ed.zones.len());
    for (zi, z) in ed.zones.iter().enumerate() {
        if ed.selected_zone == Some(zi) {
            continue;
        }
        zones.push(scene_zone(ed, zi, Emphasis::Back));
    }
    if let Some(zi) = ed.selected_zone {
        if zi < ed.zones.len() {
            zones.push(scene_zone(ed, zi, Emphasis::Front));
        }
    }

    let draft = match ed.mode {
        Mode::Drawing => Some(SceneDraft {
            points: ed
                .draft
                .iter()
                .map(|v| {
                    let (x, y) = ed.surface.to_px(v.x, v.y);
                    ScenePoint { x, y }
                })
                .collect(),
            closed: ed.draft.len() >= MIN_POLYGON_VERTICES,
            caption: match ed.draft.len() {
                0 => CAPTION_START,
                1 | 2 => CAPTION_NEED_MORE,
                _ => CAPTION_CLOSE,
            },
        }),
        _ => None,
    };

    Scene { image: Some(image), placeholder: None, zones, draft, cursor }
}

fn scene_zone(ed: &Editor, zi: usize, emphasis: Emphasis) -> SceneZone {
    let z = &ed.zones[zi];
    let ring = pixel_ring(z, &ed.surface);
    let (cx, cy) = centroid(&ring);

    // Handles are clutter on context zones: only the selected zone, the
    // hovered zone and the draft show them.
    let hovered = ed.hover.map(|h| h.zone()) == Some(zi);
    let selected = ed.selected_zone == Some(zi);
    let handles = if selected || hovered {
        let hover_vertex = match ed.hover {
            Some(Hit::Vertex { zone, vertex, .. }) if zone == zi => Some(vertex),
            _ => None,
        };
        let selected_vertex = if selected { ed.selected_vertex } else { None };
        ring.iter()
            .enumerate()
            .map(|(vi, &(x, y))| SceneHandle {
                x,
                y,
                halo: selected_vertex == Some(vi) || hover_vertex == Some(vi),
            })
            .collect()
    } else {
        Vec::new()
    };

    SceneZone {
        zone: zi,
        id: z.id.clone(),
        points: ring.into_iter().map(|(x, y)| ScenePoint { x, y }).collect(),
        label: ScenePoint { x: cx, y: cy },
        emphasis,
        handles,
        in_count: z.in_count,
        out_count: z.out_count,
        current_count: z.current_count,
    }
}

pub(crate) fn cursor_for(mode: Mode, hover: Option<Hit>, disabled: bool) -> Cursor {
    if disabled {
        return Cursor::Default;
    }
    match mode {
        Mode::Drawing => Cursor::Crosshair,
        Mode::DraggingVertex { .. } => Cursor::Move,
        Mode::Idle => match hover {
            Some(Hit::Vertex { .. }) => Cursor::Move,
            Some(Hit::Edge { .. }) | Some(Hit::Body { .. }) => Cursor::Pointer,
            None => Cursor::Default,
        },
    }
}
