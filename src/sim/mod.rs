//! Race simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Caller-supplied `dt` only (clamped per tick)
//! - Seeded RNG only
//! - Stable iteration order (player first, then AI cars by index)
//! - No rendering, audio or platform dependencies

pub mod car;
pub mod collision;
pub mod geometry;
pub mod powerup;
pub mod state;
pub mod tick;
pub mod track;

pub use car::{Car, CarRole, DriveInput};
pub use collision::{Aabb, resolve_car_collision};
pub use geometry::{
    angle_delta, clamp, closest_point_on_segment, distance, distance_to_segment, lerp,
    normalize_angle,
};
pub use powerup::{PowerUp, PowerUpField, PowerUpKind, TimedPowerUp};
pub use state::{
    CheckpointOutcome, CueSchedule, LapProgress, Race, RaceEvent, RacePhase, RaceResult,
    RaceSnapshot, ScheduledCue,
};
pub use tick::{Action, TickInput, autopilot, tick};
pub use track::{Checkpoint, PathProjection, Track, TrackError};
