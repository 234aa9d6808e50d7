pub fn seg_distance_sq(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32) {
    let vx = x2 - x1; let vy = y2 - y1;
    let wx = px - x1; let wy = py - y1;
    let vv = vx*vx + vy*vy;
    let mut t = if vv > 0.0 { (wx*vx + wy*vy) / vv } else { 0.0 };
    if t < 0.0 { t = 0.0; } else if t > 1.0 { t = 1.0; }
    let projx = x1 + t * vx; let projy = y1 + t * vy;
    let dx = px - projx; let dy = py - projy;
    (dx*dx + dy*dy, t)
}

/// Even-odd ray cast: count crossings of a horizontal ray towards +x.
pub fn point_in_polygon(px: f32, py: f32, pts: &[(f32, f32)]) -> bool {
    let n = pts.len();
    if n < 3 { return false; }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = pts[i];
        let (xj, yj) = pts[j];
        if (yi > py) != (yj > py) {
            let t = (py - yi) / (yj - yi);
            if px < xi + t * (xj - xi) { inside = !inside; }
        }
        j = i;
    }
    inside
}

/// Vertex mean; anchor for the zone's id label.
pub fn centroid(pts: &[(f32, f32)]) -> (f32, f32) {
    if pts.is_empty() { return (0.0, 0.0); }
    let mut sx = 0.0; let mut sy = 0.0;
    for &(x, y) in pts { sx += x; sy += y; }
    let n = pts.len() as f32;
    (sx / n, sy / n)
}
