//! Car-to-car collision detection and response
//!
//! Detection is deliberately coarse: each car's rotated corners are wrapped
//! in an axis-aligned box and the boxes are tested for overlap. Response is
//! a symmetric bump: both cars lose half their speed, get pushed apart a fixed
//! step and are locked out of further responses for a short cooldown.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::car::Car;
use crate::consts::{
    COLLISION_COOLDOWN, COLLISION_FORCE, COLLISION_PUSH_SCALE, COLLISION_SPEED_FACTOR,
};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Smallest box containing every point (inverted/empty box for no points)
    pub fn from_points(points: &[Vec2]) -> Self {
        points.iter().fold(
            Self {
                min: Vec2::splat(f32::INFINITY),
                max: Vec2::splat(f32::NEG_INFINITY),
            },
            |bb, &p| Self {
                min: bb.min.min(p),
                max: bb.max.max(p),
            },
        )
    }

    /// Overlap test; boxes that merely touch count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }
}

/// Apply the bump response to a pair of cars
///
/// Does nothing and returns false if either car is still cooling down from
/// an earlier collision. Cars sharing a center lose speed but are not pushed.
pub fn resolve_car_collision(a: &mut Car, b: &mut Car) -> bool {
    if a.collision_cooldown > 0.0 || b.collision_cooldown > 0.0 {
        return false;
    }

    a.speed *= COLLISION_SPEED_FACTOR;
    b.speed *= COLLISION_SPEED_FACTOR;

    let push = (b.pos - a.pos).normalize_or_zero() * (COLLISION_FORCE * COLLISION_PUSH_SCALE);
    a.pos -= push;
    b.pos += push;

    a.collision_cooldown = COLLISION_COOLDOWN;
    b.collision_cooldown = COLLISION_COOLDOWN;

    true
}
