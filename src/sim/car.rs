//! Car kinematics and AI steering
//!
//! Arcade model: a car is a point with a heading and a scalar forward speed.
//! No slip, mass or torque. Player cars follow the held controls; AI cars
//! chase the next waypoint of the track path.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Aabb};
use super::geometry::{angle_delta, clamp, normalize_angle};
use super::powerup::{PowerUpKind, TimedPowerUp};
use super::track::Track;
use crate::config::CarSpec;
use crate::consts::*;

/// Who drives the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarRole {
    Player,
    Ai,
}

/// Held driving controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub accelerate: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

/// A racing car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: u32,
    pub role: CarRole,
    pub pos: Vec2,
    /// Radians, [0, 2π)
    pub heading: f32,
    /// Forward speed (units/s), clamped to [0, max_speed] after each update
    pub speed: f32,
    /// Top speed without power-ups
    pub base_max_speed: f32,
    /// Top speed after power-up adjustment
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Radians per second at full steering authority
    pub turn_rate: f32,
    /// Per-frame speed retention at 60 Hz
    pub friction: f32,
    /// Lateral extent
    pub width: f32,
    /// Front-to-back extent
    pub height: f32,
    pub active_power_up: Option<TimedPowerUp>,
    /// Seconds until collision response is allowed again
    pub collision_cooldown: f32,
    /// AI only: index into the track path
    pub target_waypoint: usize,
}

impl Car {
    pub fn new(id: u32, role: CarRole, pos: Vec2, heading: f32, spec: &CarSpec) -> Self {
        Self {
            id,
            role,
            pos,
            heading: normalize_angle(heading),
            speed: 0.0,
            base_max_speed: spec.max_speed,
            max_speed: spec.max_speed,
            acceleration: spec.acceleration,
            deceleration: spec.deceleration,
            turn_rate: spec.turn_rate,
            friction: spec.friction,
            width: spec.width,
            height: spec.height,
            active_power_up: None,
            collision_cooldown: 0.0,
            target_waypoint: 0,
        }
    }

    /// Unit vector along the heading
    #[inline]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Kind of the currently running power-up effect, if any
    pub fn active_kind(&self) -> Option<PowerUpKind> {
        self.active_power_up.map(|p| p.kind)
    }

    /// Advance the car by `dt` seconds
    ///
    /// `input` is ignored for AI cars.
    pub fn update(&mut self, dt: f32, input: &DriveInput, track: &Track) {
        if let Some(active) = self.active_power_up.as_mut() {
            active.remaining -= dt;
            if active.remaining <= 0.0 {
                self.active_power_up = None;
            }
        }

        self.collision_cooldown = (self.collision_cooldown - dt).max(0.0);

        let accelerating = match self.role {
            CarRole::Player => {
                self.drive(dt, input);
                input.accelerate
            }
            CarRole::Ai => {
                self.steer_ai(dt, track);
                true
            }
        };

        if !accelerating {
            self.speed *= self.friction.powf(dt * 60.0);
        }

        self.max_speed = match self.active_kind() {
            Some(PowerUpKind::SpeedBoost) => self.base_max_speed * SPEED_BOOST_FACTOR,
            _ => self.base_max_speed,
        };
        if self.active_kind() == Some(PowerUpKind::SlowMotion) {
            self.speed *= SLOW_MOTION_DRAG;
        }

        self.pos += self.forward() * self.speed * dt;

        // No reverse gear: braking only bleeds forward speed
        self.speed = clamp(self.speed, 0.0, self.max_speed);
    }

    fn drive(&mut self, dt: f32, input: &DriveInput) {
        if input.accelerate {
            self.speed += self.acceleration * dt;
        }
        if input.brake {
            self.speed -= self.deceleration * dt;
        }

        // Steering authority grows with speed; a parked car can't turn
        if self.speed.abs() > STEER_MIN_SPEED && self.max_speed > 0.0 {
            let turn = self.turn_rate * dt * (self.speed.abs() / self.max_speed);
            if input.steer_left {
                self.heading -= turn;
            }
            if input.steer_right {
                self.heading += turn;
            }
        }

        self.heading = normalize_angle(self.heading);
    }

    fn steer_ai(&mut self, dt: f32, track: &Track) {
        let path = track.path();
        if path.is_empty() {
            self.speed += self.acceleration * dt * AI_FALLBACK_ACCEL_FACTOR;
            return;
        }

        let index = self.target_waypoint % path.len();
        let to_target = path[index] - self.pos;
        let bearing = to_target.y.atan2(to_target.x);

        let max_turn = self.turn_rate * AI_TURN_FACTOR * dt;
        let turn = angle_delta(self.heading, bearing).clamp(-max_turn, max_turn);
        self.heading = normalize_angle(self.heading + turn);

        // Reaching a waypoint costs that tick's throttle
        if to_target.length() < AI_WAYPOINT_RADIUS {
            self.target_waypoint = (index + 1) % path.len();
        } else {
            self.speed += self.acceleration * dt * AI_ACCEL_FACTOR;
        }
    }

    /// Replace any running effect (no stacking)
    pub fn apply_power_up(&mut self, kind: PowerUpKind, duration: f32) {
        self.active_power_up = Some(TimedPowerUp {
            kind,
            remaining: duration,
        });
    }

    /// Oriented rectangle corners, front pair first, in winding order
    ///
    /// The front/back axis runs along `height`, the lateral axis along `width`.
    pub fn corners(&self) -> [Vec2; 4] {
        let fwd = self.forward() * (self.height / 2.0);
        let lat = self.forward().perp() * (self.width / 2.0);
        [
            self.pos + fwd + lat,
            self.pos + fwd - lat,
            self.pos - fwd - lat,
            self.pos - fwd + lat,
        ]
    }

    /// Axis-aligned box around the rotated corners
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.corners())
    }

    /// Cheap overlap test on the boxes around each car's rotated corners
    ///
    /// Can report contact when the rotated rectangles themselves don't touch.
    pub fn check_collision(&self, other: &Car) -> bool {
        self.bounding_box().overlaps(&other.bounding_box())
    }

    /// Bump response against `other`; returns false while either car is on cooldown
    pub fn handle_collision(&mut self, other: &mut Car) -> bool {
        collision::resolve_car_collision(self, other)
    }
}
