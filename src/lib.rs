//! Retro Racer - A top-down arcade racing game
//!
//! Core modules:
//! - `sim`: Race simulation (car kinematics, track containment, collisions, laps)
//! - `config`: Static race configuration (track, cars, power-ups, difficulty)
//! - `highscores`: Top-10 leaderboard persisted by the host
//! - `web`: wasm-bindgen bridge for the browser renderer/audio/input layers

pub mod config;
pub mod highscores;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{AiDifficulty, CarSpec, ConfigError, PowerUpConfig, RaceConfig, TrackConfig};
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz baseline)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta a single tick will integrate (stalls get clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default oval circuit
    pub const TRACK_RADIUS_X: f32 = 400.0;
    pub const TRACK_RADIUS_Y: f32 = 300.0;
    pub const TRACK_SEGMENTS: usize = 60;
    pub const TRACK_CHECKPOINTS: usize = 4;
    pub const TRACK_WIDTH: f32 = 200.0;
    pub const TRACK_BOUNDARY_WIDTH: f32 = 50.0;

    /// Boundary correction: speed kept and nudge distance per tick
    pub const BOUNDARY_SPEED_DAMPING: f32 = 0.3;
    pub const BOUNDARY_NUDGE: f32 = 5.0;

    /// Car defaults
    pub const PLAYER_MAX_SPEED: f32 = 200.0;
    pub const AI_MAX_SPEED: f32 = 180.0;
    pub const CAR_ACCELERATION: f32 = 150.0;
    pub const CAR_DECELERATION: f32 = 100.0;
    /// Radians per second (0.05 rad per frame at 60 Hz)
    pub const CAR_TURN_RATE: f32 = 3.0;
    /// Per-frame speed retention at the 60 Hz baseline
    pub const CAR_FRICTION: f32 = 0.95;
    pub const CAR_WIDTH: f32 = 20.0;
    pub const CAR_HEIGHT: f32 = 40.0;
    /// Below this speed the player has no steering authority
    pub const STEER_MIN_SPEED: f32 = 10.0;

    /// AI steering
    pub const AI_TURN_FACTOR: f32 = 0.8;
    pub const AI_ACCEL_FACTOR: f32 = 0.8;
    pub const AI_FALLBACK_ACCEL_FACTOR: f32 = 0.7;
    pub const AI_WAYPOINT_RADIUS: f32 = 50.0;
    /// Distance of AI cars from the start position on the grid
    pub const AI_GRID_OFFSET: f32 = 50.0;

    /// Car-to-car collision response
    pub const COLLISION_COOLDOWN: f32 = 0.5;
    pub const COLLISION_SPEED_FACTOR: f32 = 0.5;
    pub const COLLISION_FORCE: f32 = 50.0;
    pub const COLLISION_PUSH_SCALE: f32 = 0.1;

    /// Power-up effects
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;
    pub const SLOW_MOTION_DRAG: f32 = 0.7;
    pub const NITRO_BOOST: f32 = 100.0;
    pub const SLOW_MOTION_DURATION: f32 = 3.0;

    /// Power-up field defaults
    pub const POWER_UP_RADIUS: f32 = 15.0;
    pub const POWER_UP_DURATION: f32 = 5.0;
    pub const POWER_UP_SPAWN_INTERVAL: f32 = 5.0;
    pub const MAX_POWER_UPS: usize = 5;

    /// Race rules
    pub const MAX_LAPS: u32 = 3;
    pub const NUM_AI_CARS: usize = 3;

    /// Scoring
    pub const POWER_UP_POINTS: u64 = 100;
    pub const LAP_POINTS: u64 = 500;
    pub const SPEED_SCORE_FACTOR: f32 = 0.1;
    pub const TICK_POSITION_POINTS: u64 = 10;
    pub const FINISH_POSITION_POINTS: u64 = 500;
    pub const TIME_BONUS_BASE: u64 = 10_000;
}
