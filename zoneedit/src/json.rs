use serde_json::Value;

use crate::model::{Vertex, Zone};

/// Wire egress: the exact shape both the polygon editor and its line-zone
/// sibling exchange with the owning application.
pub(crate) fn zones_to_value(zones: &[Zone]) -> Value {
    serde_json::to_value(zones).unwrap_or_else(|_| Value::Array(Vec::new()))
}

/// Tolerant ingest. Accepts a bare zone array or one nested under `zones`
/// or `config.zones`; anything else reads as empty. Individual zones are
/// repaired rather than rejected (see `zone_from_value`); final clamping,
/// polygon floors and id generation happen in the store's normalize pass.
pub(crate) fn zones_from_value(v: &Value) -> Vec<Zone> {
    match zone_list(v) {
        Some(list) => list.iter().map(zone_from_value).collect(),
        None => Vec::new(),
    }
}

fn zone_list(v: &Value) -> Option<&Vec<Value>> {
    if let Some(a) = v.as_array() {
        return Some(a);
    }
    if let Some(a) = v.get("zones").and_then(Value::as_array) {
        return Some(a);
    }
    v.get("config")?.get("zones")?.as_array()
}

fn zone_from_value(v: &Value) -> Zone {
    // Sloppy backends sometimes send numeric ids; keep them as strings.
    let id = match v.get("id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let polygon = v
        .get("polygon")
        .and_then(Value::as_array)
        .map(|pts| pts.iter().map(vertex_from_value).collect())
        .unwrap_or_default();
    Zone {
        id,
        polygon,
        triggering_anchors: string_list(v, "triggering_anchors"),
        triggering_classes: string_list(v, "triggering_classes"),
        min_crossing_threshold: v
            .get("min_crossing_threshold")
            .and_then(Value::as_u64)
            .map(|n| n as u32),
        in_count: v.get("in_count").and_then(Value::as_u64),
        out_count: v.get("out_count").and_then(Value::as_u64),
        current_count: v.get("current_count").and_then(Value::as_u64),
    }
}

fn vertex_from_value(v: &Value) -> Vertex {
    // Missing or non-numeric components fall back to 0.0 before clamping.
    let x = v.get("x").and_then(Value::as_f64).unwrap_or(0.0) as f32;
    let y = v.get("y").and_then(Value::as_f64).unwrap_or(0.0) as f32;
    Vertex::clamped(x, y)
}

fn string_list(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

/// Merge a companion-panel field edit into a zone. Only the pass-through
/// metadata is patchable; `min_crossing_threshold: null` clears it.
pub(crate) fn apply_meta_patch(zone: &mut Zone, patch: &Value) -> bool {
    let mut changed = false;
    if let Some(a) = patch.get("triggering_anchors").and_then(Value::as_array) {
        let list: Vec<String> = a.iter().filter_map(Value::as_str).map(String::from).collect();
        if list != zone.triggering_anchors {
            zone.triggering_anchors = list;
            changed = true;
        }
    }
    if let Some(a) = patch.get("triggering_classes").and_then(Value::as_array) {
        let list: Vec<String> = a.iter().filter_map(Value::as_str).map(String::from).collect();
        if list != zone.triggering_classes {
            zone.triggering_classes = list;
            changed = true;
        }
    }
    match patch.get("min_crossing_threshold") {
        Some(Value::Null) => {
            if zone.min_crossing_threshold.take().is_some() {
                changed = true;
            }
        }
        Some(n) => {
            if let Some(n) = n.as_u64() {
                let n = n as u32;
                if zone.min_crossing_threshold != Some(n) {
                    zone.min_crossing_threshold = Some(n);
                    changed = true;
                }
            }
        }
        None => {}
    }
    changed
}
