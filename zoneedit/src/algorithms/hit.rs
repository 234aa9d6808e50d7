use crate::geometry::math::{point_in_polygon, seg_distance_sq};
use crate::geometry::tolerance::{EDGE_TOL_PX, VERTEX_RADIUS_PX, VERTEX_RADIUS_SELECTED_PX};
use crate::mapper::SurfaceMap;
use crate::model::{Hit, Zone};

/// Resolve what lies under a pixel position. Ordering is fixed so that
/// overlapping geometry resolves deterministically: the selected zone is
/// probed before all others (list order), and vertices are probed across
/// every zone before edges, before interiors, so a small handle is never
/// shadowed by a sibling's body.
pub fn hit_impl(zones: &[Zone], selected: Option<usize>, map: &SurfaceMap, px: f32, py: f32) -> Option<Hit> {
    let order = probe_order(zones.len(), selected);
    // Vertices
    for &zi in &order {
        let r = if selected == Some(zi) { VERTEX_RADIUS_SELECTED_PX } else { VERTEX_RADIUS_PX };
        let r2 = r * r;
        let mut best: Option<(usize, f32)> = None;
        for (vi, v) in zones[zi].polygon.iter().enumerate() {
            let (vx, vy) = map.to_px(v.x, v.y);
            let dx = vx - px; let dy = vy - py; let d2 = dx*dx + dy*dy;
            if d2 <= r2 && best.map_or(true, |(_, bd)| d2 < bd) { best = Some((vi, d2)); }
        }
        if let Some((vi, d2)) = best {
            return Some(Hit::Vertex { zone: zi, vertex: vi, dist: d2.sqrt() });
        }
    }
    // Edges
    let tol2 = EDGE_TOL_PX * EDGE_TOL_PX;
    for &zi in &order {
        let pts = pixel_ring(&zones[zi], map);
        let mut best: Option<(usize, f32, f32)> = None;
        for ei in 0..pts.len() {
            let (x1, y1) = pts[ei];
            let (x2, y2) = pts[(ei + 1) % pts.len()];
            let (d2, t) = seg_distance_sq(px, py, x1, y1, x2, y2);
            if d2 <= tol2 && best.map_or(true, |(_, bd, _)| d2 < bd) { best = Some((ei, d2, t)); }
        }
        if let Some((ei, d2, t)) = best {
            return Some(Hit::Edge { zone: zi, edge: ei, t, dist: d2.sqrt() });
        }
    }
    // Interiors
    for &zi in &order {
        if point_in_polygon(px, py, &pixel_ring(&zones[zi], map)) {
            return Some(Hit::Body { zone: zi });
        }
    }
    None
}

fn probe_order(len: usize, selected: Option<usize>) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    if let Some(s) = selected {
        if s < len { order.push(s); }
    }
    for i in 0..len {
        if Some(i) != selected { order.push(i); }
    }
    order
}

pub(crate) fn pixel_ring(zone: &Zone, map: &SurfaceMap) -> Vec<(f32, f32)> {
    zone.polygon.iter().map(|v| map.to_px(v.x, v.y)).collect()
}
