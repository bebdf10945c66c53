//! Power-up pickups scattered along the track
//!
//! The field spawns a pickup every `spawn_interval` seconds while it holds
//! fewer than `max_power_ups`. Positions and kinds come from a seeded PCG
//! stream so two races with the same seed spawn identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::car::Car;
use super::geometry::lerp;
use super::track::Track;
use crate::config::PowerUpConfig;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
    Nitro,
    SlowMotion,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::Shield,
        PowerUpKind::Nitro,
        PowerUpKind::SlowMotion,
    ];

    /// HUD label
    pub fn display_name(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::Nitro => "Nitro",
            PowerUpKind::SlowMotion => "Slow Motion",
        }
    }
}

/// A power-up with a countdown, either running on a car or held by the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedPowerUp {
    pub kind: PowerUpKind,
    /// Seconds left
    pub remaining: f32,
}

/// A pickup lying on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub collected: bool,
    /// Seconds since spawn (drives the pulse animation only)
    pub age: f32,
}

/// The set of live pickups and its spawner
#[derive(Debug, Clone)]
pub struct PowerUpField {
    power_ups: Vec<PowerUp>,
    spawn_timer: f32,
    spawn_interval: f32,
    max_power_ups: usize,
    radius: f32,
    next_id: u32,
    rng: Pcg32,
}

impl PowerUpField {
    pub fn new(config: &PowerUpConfig, seed: u64) -> Self {
        Self {
            power_ups: Vec::with_capacity(config.max_power_ups),
            spawn_timer: 0.0,
            spawn_interval: config.spawn_interval,
            max_power_ups: config.max_power_ups,
            radius: config.radius,
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Live pickups in spawn order (collected ones linger until the next update)
    pub fn power_ups(&self) -> &[PowerUp] {
        &self.power_ups
    }

    pub fn len(&self) -> usize {
        self.power_ups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power_ups.is_empty()
    }

    pub fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }

    /// Advance spawn cadence, age pickups and drop collected ones
    pub fn update(&mut self, dt: f32, track: &Track) {
        self.spawn_timer += dt;

        if self.spawn_timer >= self.spawn_interval && self.power_ups.len() < self.max_power_ups {
            self.spawn(track);
            self.spawn_timer = 0.0;
        }

        for power_up in &mut self.power_ups {
            power_up.age += dt;
        }

        self.power_ups.retain(|p| !p.collected);
    }

    /// Drop a random pickup somewhere inside the track corridor
    ///
    /// Picks a random segment, a random point along it and a lateral offset
    /// within a quarter of the track width. Returns the new pickup's id, or
    /// `None` for a track without a path.
    pub fn spawn(&mut self, track: &Track) -> Option<u32> {
        let path = track.path();
        if path.is_empty() {
            return None;
        }

        let index = self.rng.random_range(0..path.len());
        let a = path[index];
        let b = path[(index + 1) % path.len()];

        let t: f32 = self.rng.random();
        let along = Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t));

        let normal = (b - a).normalize_or_zero().perp();
        let spread = track.width() / 4.0;
        let offset = if spread > 0.0 {
            self.rng.random_range(-spread..spread)
        } else {
            0.0
        };

        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        let id = self.spawn_at(kind, along + normal * offset);
        log::debug!("Spawned {:?} #{} on segment {}", kind, id, index);
        Some(id)
    }

    /// Place a specific pickup
    pub fn spawn_at(&mut self, kind: PowerUpKind, pos: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.power_ups.push(PowerUp {
            id,
            kind,
            pos,
            radius: self.radius,
            collected: false,
            age: 0.0,
        });
        id
    }

    /// Collect at most one pickup touching the car
    ///
    /// The first uncollected pickup in spawn order wins and is marked collected.
    pub fn check_collection(&mut self, car: &Car) -> Option<PowerUpKind> {
        let power_up = self
            .power_ups
            .iter_mut()
            .find(|p| !p.collected && p.pos.distance(car.pos) < p.radius + car.width / 2.0)?;
        power_up.collected = true;
        Some(power_up.kind)
    }

    /// Remove every pickup and restart the spawn timer
    pub fn clear(&mut self) {
        self.power_ups.clear();
        self.spawn_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarSpec;
    use crate::sim::car::CarRole;
    use crate::sim::test_support::square_track;

    fn config(max_power_ups: usize, spawn_interval: f32) -> PowerUpConfig {
        PowerUpConfig {
            max_power_ups,
            spawn_interval,
            ..Default::default()
        }
    }

    fn player_at(pos: Vec2) -> Car {
        Car::new(0, CarRole::Player, pos, 0.0, &CarSpec::player())
    }

    #[test]
    fn test_spawns_on_interval() {
        let track = square_track();
        let mut field = PowerUpField::new(&config(5, 5.0), 7);

        field.update(4.9, &track);
        assert!(field.is_empty());
        field.update(0.2, &track);
        assert_eq!(field.len(), 1);
        assert_eq!(field.spawn_timer(), 0.0);
    }

    #[test]
    fn test_spawned_pickups_land_in_corridor() {
        let track = square_track();
        let mut field = PowerUpField::new(&config(64, 1.0), 1234);
        for _ in 0..64 {
            field.spawn(&track);
        }
        assert_eq!(field.len(), 64);
        for p in field.power_ups() {
            assert!(track.is_on_track(p.pos), "pickup off track at {:?}", p.pos);
            let nearest = track.nearest_point_on_path(p.pos).unwrap();
            assert!(nearest.point.distance(p.pos) <= track.width() / 4.0 + 1e-3);
        }
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let track = square_track();
        let mut field = PowerUpField::new(&config(1, 0.1), 3);
        field.spawn_at(PowerUpKind::Nitro, Vec2::new(500.0, 0.0));
        for _ in 0..100 {
            field.update(1.0, &track);
            assert_eq!(field.len(), 1);
        }
    }

    #[test]
    fn test_collection_is_idempotent() {
        let track = square_track();
        let mut field = PowerUpField::new(&config(5, 100.0), 3);
        let car = player_at(Vec2::new(500.0, 0.0));
        field.spawn_at(PowerUpKind::Shield, Vec2::new(520.0, 0.0));
        field.spawn_at(PowerUpKind::Nitro, Vec2::new(900.0, 0.0));

        assert_eq!(field.check_collection(&car), Some(PowerUpKind::Shield));
        assert_eq!(field.check_collection(&car), None);
        assert_eq!(field.len(), 2);

        field.update(1.0 / 60.0, &track);
        assert_eq!(field.len(), 1);
        field.update(1.0 / 60.0, &track);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_first_pickup_in_spawn_order_wins() {
        let mut field = PowerUpField::new(&config(5, 100.0), 3);
        let car = player_at(Vec2::new(500.0, 0.0));
        field.spawn_at(PowerUpKind::SlowMotion, Vec2::new(490.0, 0.0));
        field.spawn_at(PowerUpKind::Nitro, Vec2::new(500.0, 0.0));

        assert_eq!(field.check_collection(&car), Some(PowerUpKind::SlowMotion));
        assert_eq!(field.check_collection(&car), Some(PowerUpKind::Nitro));
    }

    #[test]
    fn test_pickup_radius() {
        let mut field = PowerUpField::new(&config(5, 100.0), 3);
        // Reach is pickup radius (15) plus half the car width (10)
        field.spawn_at(PowerUpKind::Nitro, Vec2::new(525.0, 0.0));
        assert_eq!(field.check_collection(&player_at(Vec2::new(500.0, 0.0))), None);
        assert_eq!(
            field.check_collection(&player_at(Vec2::new(501.0, 0.0))),
            Some(PowerUpKind::Nitro)
        );
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let track = square_track();
        let mut a = PowerUpField::new(&config(5, 1.0), 99);
        let mut b = PowerUpField::new(&config(5, 1.0), 99);
        for _ in 0..5 {
            a.spawn(&track);
            b.spawn(&track);
        }
        for (pa, pb) in a.power_ups().iter().zip(b.power_ups()) {
            assert_eq!(pa.kind, pb.kind);
            assert_eq!(pa.pos, pb.pos);
        }
    }

    #[test]
    fn test_clear() {
        let track = square_track();
        let mut field = PowerUpField::new(&config(5, 10.0), 3);
        field.spawn(&track);
        field.update(3.0, &track);
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.spawn_timer(), 0.0);
    }
}
