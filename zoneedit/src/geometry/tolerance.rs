// Centralized pixel tolerances for hit testing and drawing

pub const VERTEX_RADIUS_PX: f32 = 6.0;           // handle hit radius, unselected zones
pub const VERTEX_RADIUS_SELECTED_PX: f32 = 9.0;  // wider for the selected zone so focus is not lost on a near miss
pub const EDGE_TOL_PX: f32 = 6.0;                // click-an-edge-to-insert threshold
pub const CLOSE_RADIUS_PX: f32 = 10.0;           // clicking this close to the first draft point closes the polygon

pub const MIN_POLYGON_VERTICES: usize = 3;       // a polygon never degenerates below a triangle

pub const EPS_DENOM: f32 = 1e-8;                 // denominator guard for ratios

#[inline] pub fn clamp01(x: f32) -> f32 { x.max(0.0).min(1.0) }
#[inline] pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool { (a - b).abs() <= eps }

#[inline]
pub fn safe_div(num: f32, den: f32, fallback: f32) -> f32 {
    if den.abs() <= EPS_DENOM { fallback } else { num / den }
}
