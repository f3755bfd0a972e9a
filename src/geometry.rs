//! Sector geometry
//!
//! Pure mapping between continuous wheel angles and the eight discrete mood
//! sectors. Angles are radians, counter-clockwise from the positive x axis with
//! y pointing up. Screen coordinates (y down) go through [`pointer_angle`].

use serde::Serialize;
use std::f64::consts::{FRAC_PI_4, PI, TAU};

use crate::types::{MoodSample, Sector, SECTOR_COUNT};

/// Angular width of one sector (π/4)
pub const SECTOR_WIDTH: f64 = FRAC_PI_4;

/// A point in screen space (pixels, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Wrap any angle into `[0, 2π)`. Non-finite input maps to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Map an angle to the sector containing it
pub fn angle_to_sector(angle: f64) -> Sector {
    let index = (normalize_angle(angle) / SECTOR_WIDTH).floor() as i64;
    Sector::wrapping(index % SECTOR_COUNT as i64)
}

/// Bisector of a sector's range
pub fn sector_to_mid_angle(sector: Sector) -> f64 {
    (sector.index() as f64 + 0.5) * SECTOR_WIDTH
}

/// Half-open `[start, end)` range of a sector, in radians
pub fn sector_range(sector: Sector) -> (f64, f64) {
    let start = sector.index() as f64 * SECTOR_WIDTH;
    (start, start + SECTOR_WIDTH)
}

/// Shortest signed difference `to - from`, in `(-π, π]`
pub fn signed_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_angle(to - from);
    if delta > PI {
        delta - TAU
    } else {
        delta
    }
}

/// Wheel angle of a screen point relative to the wheel center
pub fn pointer_angle(center: Point, point: Point) -> f64 {
    normalize_angle((center.y - point.y).atan2(point.x - center.x))
}

/// Screen position at `radius` from `center` along a wheel angle
pub fn point_on_wheel(center: Point, radius: f64, angle: f64) -> Point {
    Point {
        x: center.x + radius * angle.cos(),
        y: center.y - radius * angle.sin(),
    }
}

impl MoodSample {
    /// Derive a sample from an arbitrary angle
    pub fn from_angle(angle: f64) -> Self {
        let angle = normalize_angle(angle);
        Self {
            x: angle.cos(),
            y: angle.sin(),
            sector: angle_to_sector(angle),
            angle_degrees: angle.to_degrees(),
        }
    }

    /// Sample at the sector's bisector
    pub fn for_sector(sector: Sector) -> Self {
        Self::from_angle(sector_to_mid_angle(sector))
    }

    /// Angle of the sample in radians
    pub fn angle_radians(&self) -> f64 {
        self.angle_degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deg(d: f64) -> f64 {
        d.to_radians()
    }

    #[test]
    fn test_sector_boundaries() {
        assert_eq!(angle_to_sector(0.0).index(), 0);
        assert_eq!(angle_to_sector(deg(44.9)).index(), 0);
        assert_eq!(angle_to_sector(deg(45.0) + 1e-9).index(), 1);
        assert_eq!(angle_to_sector(deg(200.0)).index(), 4);
        assert_eq!(angle_to_sector(deg(359.99)).index(), 7);
        assert_eq!(angle_to_sector(TAU).index(), 0);
    }

    #[test]
    fn test_monotonic_over_circle() {
        let mut last = 0;
        for step in 0..3600 {
            let theta = step as f64 / 3600.0 * TAU;
            let sector = angle_to_sector(theta).index();
            assert!(sector < SECTOR_COUNT);
            assert!(sector >= last, "sector decreased at step {}", step);
            last = sector;
        }
    }

    #[test]
    fn test_full_turn_invariance() {
        for step in 0..360 {
            let theta = deg(step as f64 + 0.3);
            let expected = angle_to_sector(theta);
            for k in [-3i32, -1, 1, 2, 7] {
                assert_eq!(angle_to_sector(theta + TAU * k as f64), expected);
            }
        }
    }

    #[test]
    fn test_mid_angle_round_trip() {
        for sector in Sector::ALL {
            assert_eq!(angle_to_sector(sector_to_mid_angle(sector)), sector);
            let (start, end) = sector_range(sector);
            let mid = sector_to_mid_angle(sector);
            assert!(start < mid && mid < end);
        }
    }

    #[test]
    fn test_non_finite_angle_is_total() {
        assert_eq!(angle_to_sector(f64::NAN).index(), 0);
        assert_eq!(angle_to_sector(f64::INFINITY).index(), 0);
        assert!(normalize_angle(-1e-18) < TAU);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_signed_delta_direction() {
        assert!((signed_delta(deg(10.0), deg(50.0)) - deg(40.0)).abs() < 1e-12);
        assert!((signed_delta(deg(350.0), deg(10.0)) - deg(20.0)).abs() < 1e-12);
        assert!((signed_delta(deg(10.0), deg(350.0)) + deg(20.0)).abs() < 1e-12);
        assert!((signed_delta(0.0, PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_angle_uses_screen_axes() {
        let center = Point::new(170.0, 170.0);
        // Straight up on screen is 90°
        assert!((pointer_angle(center, Point::new(170.0, 100.0)) - deg(90.0)).abs() < 1e-12);
        // Left is 180°
        assert!((pointer_angle(center, Point::new(100.0, 170.0)) - PI).abs() < 1e-12);
        // Down is 270°
        assert!((pointer_angle(center, Point::new(170.0, 240.0)) - deg(270.0)).abs() < 1e-12);
    }

    #[test]
    fn test_point_on_wheel_inverts_pointer_angle() {
        let center = Point::new(50.0, 50.0);
        for step in 0..16 {
            let angle = deg(step as f64 * 22.5 + 1.0);
            let p = point_on_wheel(center, 30.0, angle);
            assert!((pointer_angle(center, p) - angle).abs() < 1e-9);
            assert!((p.distance(center) - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mood_sample_from_angle() {
        let sample = MoodSample::from_angle(deg(-90.0));
        assert_eq!(sample.sector.index(), 6);
        assert!((sample.angle_degrees - 270.0).abs() < 1e-9);
        assert!(sample.x.abs() < 1e-12);
        assert!((sample.y + 1.0).abs() < 1e-12);

        let mid = MoodSample::for_sector(Sector::ALL[2]);
        assert!((mid.angle_degrees - 112.5).abs() < 1e-9);
        assert_eq!(mid.sector.index(), 2);
    }
}
