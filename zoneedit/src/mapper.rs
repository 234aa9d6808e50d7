use crate::geometry::tolerance::{clamp01, safe_div};

/// Converts between drawing-surface pixel space and the zone model's
/// normalized [0,1] space. Pure functions of the current surface size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceMap {
    pub width: f32,
    pub height: f32,
}

impl SurfaceMap {
    pub fn new(width: f32, height: f32) -> SurfaceMap {
        let sane = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        SurfaceMap { width: sane(width), height: sane(height) }
    }

    /// Pixel → normalized, clamped so off-surface pointer positions never
    /// produce out-of-range vertices. A zero-sized surface yields (0,0).
    pub fn to_norm(&self, px: f32, py: f32) -> (f32, f32) {
        (
            clamp01(safe_div(px, self.width, 0.0)),
            clamp01(safe_div(py, self.height, 0.0)),
        )
    }

    /// Normalized → pixel.
    pub fn to_px(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.width, y * self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_tolerance() {
        let map = SurfaceMap::new(640.0, 480.0);
        let (nx, ny) = map.to_norm(123.0, 456.0);
        let (px, py) = map.to_px(nx, ny);
        assert!((px - 123.0).abs() < 1e-3);
        assert!((py - 456.0).abs() < 1e-3);
    }

    #[test]
    fn off_surface_positions_clamp() {
        let map = SurfaceMap::new(640.0, 480.0);
        assert_eq!(map.to_norm(-50.0, -1.0), (0.0, 0.0));
        assert_eq!(map.to_norm(10_000.0, 9_999.0), (1.0, 1.0));
    }

    #[test]
    fn zero_surface_yields_origin() {
        let map = SurfaceMap::new(0.0, 0.0);
        assert_eq!(map.to_norm(37.0, 91.0), (0.0, 0.0));
        let bad = SurfaceMap::new(f32::NAN, -3.0);
        assert_eq!(bad.to_norm(5.0, 5.0), (0.0, 0.0));
    }
}
