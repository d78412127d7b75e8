//! Wind vector helpers.
//!
//! Bearings are compass degrees, 0 = north, clockwise. Forecast wind
//! directions are meteorological: they name where the wind comes *from*.

use serde::{Deserialize, Serialize};

/// Wind split relative to a travel heading. All values are non-negative speeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindComponents {
    pub headwind: f64,
    pub tailwind: f64,
    pub crosswind: f64,
}

/// Unit vector `(east, north)` for a compass bearing.
fn unit(bearing_deg: f64) -> (f64, f64) {
    let rad = bearing_deg.to_radians();
    (rad.sin(), rad.cos())
}

/// Decompose a wind of `speed` blowing from `from_deg` against a rider
/// travelling towards `heading_deg`.
pub fn wind_components(speed: f64, from_deg: f64, heading_deg: f64) -> WindComponents {
    let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };

    let (tx, ty) = unit(from_deg + 180.0);
    let (wx, wy) = (tx * speed, ty * speed);
    let (hx, hy) = unit(heading_deg);

    let along = wx * hx + wy * hy;
    let across = wx * hy - wy * hx;

    WindComponents {
        headwind: (-along).max(0.0),
        tailwind: along.max(0.0),
        crosswind: across.abs(),
    }
}

/// Reciprocal bearing, normalized to `[0, 360)`.
pub fn reciprocal(bearing_deg: f64) -> f64 {
    normalize_bearing(bearing_deg + 180.0)
}

pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    if bearing_deg.is_finite() {
        bearing_deg.rem_euclid(360.0)
    } else {
        0.0
    }
}

const COMPASS_8: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass name, e.g. `"SW"`.
pub fn compass_point(bearing_deg: f64) -> &'static str {
    let idx = (normalize_bearing(bearing_deg) / 45.0).round() as usize % 8;
    COMPASS_8[idx]
}

/// Compass name with rounded degrees, e.g. `"NW (315°)"`.
pub fn wind_dir_text(bearing_deg: f64) -> String {
    let deg = normalize_bearing(bearing_deg);
    format!("{} ({}°)", compass_point(deg), deg.round() as i64 % 360)
}

/// Arrow glyph pointing along `bearing_deg`.
pub fn arrow(bearing_deg: f64) -> char {
    const ARROWS: [char; 8] = ['↑', '↗', '→', '↘', '↓', '↙', '←', '↖'];
    let idx = (normalize_bearing(bearing_deg) / 45.0).round() as usize % 8;
    ARROWS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn riding_into_the_wind_is_pure_headwind() {
        for from in [0.0, 37.0, 90.0, 181.5, 300.0] {
            let c = wind_components(20.0, from, from);
            assert!((c.headwind - 20.0).abs() < EPS, "from {from}: {c:?}");
            assert!(c.crosswind.abs() < EPS);
            assert!(c.tailwind.abs() < EPS);
        }
    }

    #[test]
    fn riding_away_from_the_wind_is_pure_tailwind() {
        for from in [0.0, 45.0, 200.0, 359.0] {
            let c = wind_components(15.0, from, from + 180.0);
            assert!((c.tailwind - 15.0).abs() < EPS, "from {from}: {c:?}");
            assert!(c.headwind.abs() < EPS);
            assert!(c.crosswind.abs() < EPS);
        }
    }

    #[test]
    fn perpendicular_heading_is_pure_crosswind() {
        for from in [0.0, 120.0, 270.0] {
            for heading in [from + 90.0, from - 90.0] {
                let c = wind_components(12.0, from, heading);
                assert!((c.crosswind - 12.0).abs() < 1e-9, "{from}/{heading}: {c:?}");
                assert!(c.headwind < 1e-9);
                assert!(c.tailwind < 1e-9);
            }
        }
    }

    #[test]
    fn oblique_wind_splits_by_cosine() {
        let c = wind_components(10.0, 0.0, 60.0);
        assert!((c.headwind - 5.0).abs() < 1e-9);
        assert!((c.crosswind - 10.0 * 60f64.to_radians().sin()).abs() < 1e-9);
    }

    #[test]
    fn bad_speed_is_treated_as_calm() {
        let c = wind_components(f64::NAN, 10.0, 10.0);
        assert_eq!(c.headwind, 0.0);
        assert_eq!(c.crosswind, 0.0);
    }

    #[test]
    fn compass_text() {
        assert_eq!(wind_dir_text(0.0), "N (0°)");
        assert_eq!(wind_dir_text(359.6), "N (0°)");
        assert_eq!(wind_dir_text(225.0), "SW (225°)");
        assert_eq!(compass_point(-90.0), "W");
        assert_eq!(arrow(180.0), '↓');
        assert_eq!(reciprocal(270.0), 90.0);
    }
}
