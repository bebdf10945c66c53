//! Planar geometry helpers
//!
//! Pure, total functions shared by the track, car and power-up code.
//! Degenerate inputs (zero-length segments) fall back to point queries
//! instead of dividing by zero.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Closest point to `p` on the segment `[s1, s2]`
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond either
/// end snap to that endpoint. A zero-length segment returns `s1`.
pub fn closest_point_on_segment(p: Vec2, s1: Vec2, s2: Vec2) -> Vec2 {
    let seg = s2 - s1;
    let len_sq = seg.length_squared();
    if len_sq == 0.0 {
        return s1;
    }
    let t = ((p - s1).dot(seg) / len_sq).clamp(0.0, 1.0);
    s1 + seg * t
}

/// Distance from `p` to the segment `[s1, s2]`
#[inline]
pub fn distance_to_segment(p: Vec2, s1: Vec2, s2: Vec2) -> f32 {
    p.distance(closest_point_on_segment(p, s1, s2))
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest signed rotation from `from` to `to`, in (-π, π]
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    let delta = (to - from).rem_euclid(TAU);
    if delta > PI { delta - TAU } else { delta }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp without panicking on an inverted range (`hi` wins)
#[inline]
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}
