//! # Geometry Helpers
//!
//! Scalar utilities shared by lanes, controllers and the environments, plus
//! the oriented-rectangle overlap test used for collision detection.

use std::f64::consts::PI;

pub type Vec2 = glam::DVec2;

/// Values closer to zero than this are pushed away from it by [`not_zero`].
const EPSILON: f64 = 0.01;

/// Linearly map `v` from the interval `x` to the interval `y`.
pub fn lmap(v: f64, x: [f64; 2], y: [f64; 2]) -> f64 {
    y[0] + (v - x[0]) * (y[1] - y[0]) / (x[1] - x[0])
}

pub fn not_zero(x: f64) -> f64 {
    if x.abs() > EPSILON {
        x
    } else if x >= 0.0 {
        EPSILON
    } else {
        -EPSILON
    }
}

/// Wrap an angle into `[-pi, pi)`.
pub fn wrap_to_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// An oriented rectangle: centre, full length along the heading, full width.
#[derive(Clone, Copy, Debug)]
pub struct Rect {
    pub center: Vec2,
    pub length: f64,
    pub width: f64,
    pub heading: f64,
}

impl Rect {
    fn corners(&self) -> [Vec2; 4] {
        let along = Vec2::from_angle(self.heading) * (self.length / 2.0);
        let across = Vec2::from_angle(self.heading).perp() * (self.width / 2.0);
        [
            self.center + along + across,
            self.center + along - across,
            self.center - along - across,
            self.center - along + across,
        ]
    }

    fn axes(&self) -> [Vec2; 2] {
        let dir = Vec2::from_angle(self.heading);
        [dir, dir.perp()]
    }
}

/// Separating-axis test between two oriented rectangles.
pub fn rotated_rectangles_intersect(a: &Rect, b: &Rect) -> bool {
    let corners_a = a.corners();
    let corners_b = b.corners();
    for axis in a.axes().into_iter().chain(b.axes()) {
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

fn project(corners: &[Vec2; 4], axis: Vec2) -> (f64, f64) {
    corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        let p = c.dot(axis);
        (lo.min(p), hi.max(p))
    })
}
