//! Screen-space geometry around a movable pole.
//!
//! Cartesian coordinates are screen pixels (braille dots in the terminal
//! front-end). Polar coordinates are `(r, theta)` measured from the pole,
//! with `r` in pixels.

use crate::error::KernelError;
use crate::units::AU_METERS;
use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, o: Point) -> Point {
        Point::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, o: Point) -> Point {
        Point::new(self.x - o.x, self.y - o.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Polar {
    pub r: f64,
    pub theta: f64,
}

impl Polar {
    pub const fn new(r: f64, theta: f64) -> Self {
        Self { r, theta }
    }
}

/// Pixels per astronomical unit. Always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale(f64);

impl Scale {
    pub fn new(px_per_au: f64) -> Result<Self, KernelError> {
        if px_per_au.is_finite() && px_per_au > 0.0 {
            Ok(Self(px_per_au))
        } else {
            Err(KernelError::InvalidScale(px_per_au))
        }
    }

    pub fn px_per_au(self) -> f64 {
        self.0
    }

    pub fn meters_to_pixels(self, meters: f64) -> f64 {
        meters * self.0 / AU_METERS
    }

    pub fn pixels_to_meters(self, px: f64) -> f64 {
        px * AU_METERS / self.0
    }

    /// Scale after a fractional zoom, e.g. `0.1` for +10%.
    pub fn zoomed(self, delta_fraction: f64) -> Result<Self, KernelError> {
        Self::new(self.0 * (1.0 + delta_fraction))
    }
}

/// Convert a screen point to polar coordinates around `pole`.
///
/// Uses the one-argument arctangent, so `theta` is only meaningful for
/// points right of the pole; points on the left come back reflected through
/// the pole when converted back.
pub fn cartesian_to_polar(pole: Point, p: Point) -> Polar {
    let d = p - pole;
    if d.x == 0.0 {
        if d.y == 0.0 {
            return Polar::new(0.0, 0.0);
        }
        return Polar::new(d.y.abs(), d.y.signum() * FRAC_PI_2);
    }
    Polar::new(d.x.hypot(d.y), (d.y / d.x).atan())
}

pub fn polar_to_cartesian(pole: Point, polar: Polar) -> Point {
    let (s, c) = polar.theta.sin_cos();
    pole + Point::new(polar.r * c, polar.r * s)
}

pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    let d = a - b;
    d.x.hypot(d.y)
}

/// Distance between two polar points sharing a pole (law of cosines).
pub fn polar_distance(a: Polar, b: Polar) -> f64 {
    let sq = a.r * a.r + b.r * b.r - 2.0 * a.r * b.r * (a.theta - b.theta).cos();
    // cancellation can push coincident points a hair below zero
    sq.max(0.0).sqrt()
}

/// Difference of polar radii, treating both bodies as colinear with the pole.
pub fn radial_distance(a: Polar, b: Polar) -> f64 {
    (a.r - b.r).abs()
}

/// Axis-aligned screen box.
///
/// Resizing keeps the top-left corner where it was, like a blitting rect,
/// so the center moves unless it is set again afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

impl Rect {
    pub fn centered(center: Point, w: f64, h: f64) -> Self {
        Self { cx: center.x, cy: center.y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    pub fn set_center(&mut self, c: Point) {
        self.cx = c.x;
        self.cy = c.y;
    }

    pub fn left(&self) -> f64 {
        self.cx - self.w * 0.5
    }

    pub fn top(&self) -> f64 {
        self.cy - self.h * 0.5
    }

    pub fn width(&self) -> f64 {
        self.w
    }

    pub fn height(&self) -> f64 {
        self.h
    }

    pub fn set_size(&mut self, w: f64, h: f64) {
        self.cx += (w - self.w) * 0.5;
        self.cy += (h - self.h) * 0.5;
        self.w = w;
        self.h = h;
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (self.left(), self.top());
        p.x >= x && p.x < x + self.w && p.y >= y && p.y < y + self.h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const POLE: Point = Point::new(640.0, 360.0);

    #[test]
    fn round_trip_right_half_plane() {
        for &(x, y) in &[(700.0, 360.0), (641.5, -20.0), (1000.0, 900.0), (650.0, 355.25)] {
            let p = Point::new(x, y);
            let back = polar_to_cartesian(POLE, cartesian_to_polar(POLE, p));
            assert_relative_eq!(back.x, p.x, epsilon = 1e-9);
            assert_relative_eq!(back.y, p.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn left_half_plane_reflects_through_pole() {
        let p = Point::new(600.0, 380.0);
        let back = polar_to_cartesian(POLE, cartesian_to_polar(POLE, p));
        assert_relative_eq!(back.x, 680.0, epsilon = 1e-9);
        assert_relative_eq!(back.y, 340.0, epsilon = 1e-9);
    }

    #[test]
    fn vertical_axis_edge_cases() {
        let up = cartesian_to_polar(POLE, Point::new(640.0, 300.0));
        assert_eq!(up, Polar::new(60.0, -FRAC_PI_2));
        let down = cartesian_to_polar(POLE, Point::new(640.0, 400.0));
        assert_eq!(down, Polar::new(40.0, FRAC_PI_2));
        assert_eq!(cartesian_to_polar(POLE, POLE), Polar::new(0.0, 0.0));
    }

    #[test]
    fn law_of_cosines_matches_euclidean() {
        let a = Polar::new(120.0, 0.3);
        let b = Polar::new(45.0, 2.9);
        let pa = polar_to_cartesian(POLE, a);
        let pb = polar_to_cartesian(POLE, b);
        assert_relative_eq!(polar_distance(a, b), euclidean_distance(pa, pb), epsilon = 1e-9);
        assert_relative_eq!(polar_distance(a, a), 0.0, epsilon = 1e-6);
        assert_eq!(radial_distance(a, b), 75.0);
    }

    #[test]
    fn scale_conversions() {
        let s = Scale::new(25_000.0).unwrap();
        assert_relative_eq!(s.meters_to_pixels(AU_METERS), 25_000.0);
        assert_relative_eq!(s.pixels_to_meters(s.meters_to_pixels(1.7e9)), 1.7e9, max_relative = 1e-12);
        assert_relative_eq!(s.zoomed(0.1).unwrap().px_per_au(), 27_500.0, max_relative = 1e-12);
    }

    #[test]
    fn scale_rejects_non_positive() {
        assert_eq!(Scale::new(0.0), Err(KernelError::InvalidScale(0.0)));
        assert!(Scale::new(-3.0).is_err());
        assert!(Scale::new(f64::NAN).is_err());
        assert!(Scale::new(100.0).unwrap().zoomed(-1.0).is_err());
    }

    #[test]
    fn rect_resize_keeps_corner() {
        let mut r = Rect::centered(Point::new(10.0, 10.0), 4.0, 4.0);
        r.set_size(8.0, 8.0);
        assert_eq!(r.center(), Point::new(12.0, 12.0));
        r.set_center(Point::new(10.0, 10.0));
        assert_eq!(r.center(), Point::new(10.0, 10.0));
        assert!(r.contains(Point::new(6.0, 6.0)));
        assert!(!r.contains(Point::new(14.0, 10.0)));
    }
}
