/// Plane geometry shared by controllers, collision and the renderer.
///
/// Canvas space: origin top-left, +x right, +y DOWN. Angles are radians
/// measured from +x toward +y, so "up" on screen is -π/2.

use std::f32::consts::{PI, TAU};

/// Playfield extent. Entities live in `[size, width - size] × [size, height - size]`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Bounds { width, height }
    }

    /// Would a body of radius `size` centered at (x, y) poke outside?
    pub fn is_outside(&self, x: f32, y: f32, size: f32) -> bool {
        x < size || x > self.width - size || y < size || y > self.height - size
    }

    /// Pull (x, y) back inside the playable rectangle for a body of radius `size`.
    pub fn clamp(&self, x: f32, y: f32, size: f32) -> (f32, f32) {
        (clamp_axis(x, size, self.width), clamp_axis(y, size, self.height))
    }
}

/// A degenerate axis (extent < 2·size) collapses to its midpoint.
fn clamp_axis(v: f32, size: f32, extent: f32) -> f32 {
    let lo = size;
    let hi = extent - size;
    if hi < lo {
        return extent / 2.0;
    }
    if v.is_nan() {
        return lo;
    }
    v.clamp(lo, hi)
}

#[inline]
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (bx - ax).hypot(by - ay)
}

/// Angle from (ax, ay) toward (bx, by).
#[inline]
pub fn bearing(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    (by - ay).atan2(bx - ax)
}

/// Wrap any angle into (-π, π]. Angles already in range come back untouched.
pub fn wrap_angle(a: f32) -> f32 {
    if a > -PI && a <= PI {
        return a;
    }
    let mut r = a.rem_euclid(TAU);
    if r > PI {
        r -= TAU;
    }
    r
}

/// Advance an animation phase, keeping it in [0, 2π).
pub fn advance_pulse(pulse: f32, step: f32) -> f32 {
    let p = (pulse + step).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if p >= TAU { 0.0 } else { p }
}
