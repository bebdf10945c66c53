//! Fixed timestep race tick
//!
//! Advances one race deterministically: same seed plus same inputs gives
//! the same race.

use super::car::{Car, DriveInput};
use super::geometry::angle_delta;
use super::powerup::{PowerUpKind, TimedPowerUp};
use super::state::{CheckpointOutcome, Race, RaceEvent, RacePhase, RaceResult};
use super::track::Track;
use crate::consts::*;

/// Ranking weight of a completed lap
const LAP_PROGRESS_WEIGHT: f32 = 1000.0;
/// Ranking weight of a checkpoint index
const CHECKPOINT_PROGRESS_WEIGHT: f32 = 100.0;
/// Heading error (radians) the autopilot tolerates before steering
const AUTOPILOT_DEADBAND: f32 = 0.05;
/// Waypoints the autopilot aims past its nearest segment
const AUTOPILOT_LOOKAHEAD: usize = 2;

/// Logical controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accelerate,
    Brake,
    SteerLeft,
    SteerRight,
    Pause,
    ActivatePowerUp,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "accelerate" | "up" => Some(Action::Accelerate),
            "brake" | "down" => Some(Action::Brake),
            "steer_left" | "left" => Some(Action::SteerLeft),
            "steer_right" | "right" => Some(Action::SteerRight),
            "pause" => Some(Action::Pause),
            "activate_power_up" | "power_up" | "space" => Some(Action::ActivatePowerUp),
            _ => None,
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held driving controls
    pub drive: DriveInput,
    /// Pause toggle
    pub pause: bool,
    /// Use the held power-up
    pub activate_power_up: bool,
    /// Idle/demo mode - autopilot drives the player
    pub idle_mode: bool,
}

impl TickInput {
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Accelerate => self.drive.accelerate = held,
            Action::Brake => self.drive.brake = held,
            Action::SteerLeft => self.drive.steer_left = held,
            Action::SteerRight => self.drive.steer_right = held,
            Action::Pause => self.pause = held,
            Action::ActivatePowerUp => self.activate_power_up = held,
        }
    }
}

/// Advance the race by one timestep
pub fn tick(race: &mut Race, input: &TickInput, dt: f32) {
    race.events.clear();

    // Handle pause toggle
    if input.pause {
        match race.phase {
            RacePhase::Racing => {
                race.phase = RacePhase::Paused;
                log::info!("Race paused at {:.2}s", race.race_time);
                return;
            }
            RacePhase::Paused => {
                race.phase = RacePhase::Racing;
                log::info!("Race resumed");
            }
            RacePhase::Finished => {}
        }
    }

    if race.phase != RacePhase::Racing {
        return;
    }

    let dt = if dt > MAX_FRAME_DT {
        log::warn!("Clamping frame dt {:.3}s to {:.3}s", dt, MAX_FRAME_DT);
        MAX_FRAME_DT
    } else {
        // Also maps NaN to 0
        dt.max(0.0)
    };

    race.clock += dt;
    race.race_time += dt;
    for cue in race.cues.fire_due(race.clock) {
        if cue.event == RaceEvent::RaceStart {
            // Race time restarts at the start signal
            race.race_time = race.clock - cue.delay;
        }
        race.events.push(cue.event);
    }

    if input.activate_power_up {
        race.activate_power_up();
    }

    // Drive
    let drive = if input.idle_mode {
        autopilot(&race.player, &race.track)
    } else {
        input.drive
    };
    race.player.update(dt, &drive, &race.track);
    for car in &mut race.ai_cars {
        car.update(dt, &DriveInput::default(), &race.track);
    }

    // Walls
    race.track.handle_boundary_collision(&mut race.player);
    for car in &mut race.ai_cars {
        race.track.handle_boundary_collision(car);
    }

    // Car vs car: player first, then AI pairs
    for car in &mut race.ai_cars {
        if race.player.check_collision(car) && race.player.handle_collision(car) {
            race.events.push(RaceEvent::Collision);
        }
    }
    for j in 1..race.ai_cars.len() {
        let (before, rest) = race.ai_cars.split_at_mut(j);
        let b = &mut rest[0];
        for a in before.iter_mut() {
            if a.check_collision(b) {
                a.handle_collision(b);
            }
        }
    }

    // Pickups
    if let Some(kind) = race.power_ups.check_collection(&race.player) {
        let duration = race.config.power_ups.duration;
        race.held_power_up = Some(TimedPowerUp {
            kind,
            remaining: duration,
        });
        race.player.apply_power_up(kind, duration);
        race.score += POWER_UP_POINTS;
        race.events.push(RaceEvent::PowerUpCollected(kind));
        log::debug!("Player collected {}", kind.display_name());
    }

    if let Some(held) = race.held_power_up.as_mut() {
        held.remaining -= dt;
        if held.remaining <= 0.0 {
            race.held_power_up = None;
        }
    }

    race.power_ups.update(dt, &race.track);

    let max_laps = race.config.max_laps;
    let next = race
        .track
        .advance_checkpoint(&race.player, race.player_progress.current_checkpoint);
    match race.player_progress.record_checkpoint(next, max_laps) {
        CheckpointOutcome::Unchanged => {}
        CheckpointOutcome::Advanced { index } => {
            race.events.push(RaceEvent::CheckpointPassed(index));
        }
        CheckpointOutcome::StartLineCrossed => {
            race.events.push(RaceEvent::StartLineCrossed);
        }
        CheckpointOutcome::LapCompleted { lap } => {
            race.score += LAP_POINTS;
            race.events.push(RaceEvent::LapCompleted { lap });
            log::info!("Lap {} of {} at {:.2}s", lap, max_laps, race.race_time);
        }
        CheckpointOutcome::Finished => race.finish(),
    }

    if race.phase != RacePhase::Finished {
        let speed_points = (race.player.speed.abs() * SPEED_SCORE_FACTOR).floor() as u64;
        let standing = race.standing_factor(race.player_rank());
        race.score += speed_points + standing * TICK_POSITION_POINTS;
    }

    race.camera = race.player.pos;
}

impl Race {
    /// Use the held power-up, if any
    ///
    /// Nitro kicks the player's speed, SlowMotion drags every AI car. Other
    /// kinds are simply consumed.
    pub fn activate_power_up(&mut self) -> Option<PowerUpKind> {
        let held = self.held_power_up.take().filter(|p| p.remaining > 0.0)?;

        match held.kind {
            PowerUpKind::Nitro => {
                self.player.speed = (self.player.speed + NITRO_BOOST).min(self.player.max_speed);
            }
            PowerUpKind::SlowMotion => {
                for car in &mut self.ai_cars {
                    car.apply_power_up(PowerUpKind::SlowMotion, SLOW_MOTION_DURATION);
                }
            }
            PowerUpKind::SpeedBoost | PowerUpKind::Shield => {}
        }

        log::debug!("Player activated {}", held.kind.display_name());
        self.events.push(RaceEvent::PowerUpActivated(held.kind));
        Some(held.kind)
    }

    /// Approximate race progress of a car
    ///
    /// Every car is credited with the race's current lap. Uses the nearest
    /// checkpoint and adds the distance to it, so a car scores higher the
    /// further it is from that checkpoint.
    pub fn progress_of(&self, car: &Car) -> f32 {
        let lap = self.player_progress.lap;
        let index = self.track.current_checkpoint_index(car);
        let dist = self
            .track
            .checkpoints()
            .get(index)
            .map_or(0.0, |cp| car.pos.distance(cp.pos));
        lap as f32 * LAP_PROGRESS_WEIGHT + index as f32 * CHECKPOINT_PROGRESS_WEIGHT + dist
    }

    /// Player's live standing, 1-indexed
    pub fn player_rank(&self) -> u32 {
        let mine = self.progress_of(&self.player);
        let ahead = self
            .ai_cars
            .iter()
            .filter(|car| self.progress_of(car) > mine)
            .count();
        1 + ahead as u32
    }

    /// Cars at or behind `rank`, counting one extra slot
    fn standing_factor(&self, rank: u32) -> u64 {
        (self.ai_cars.len() as u64 + 2).saturating_sub(rank as u64)
    }

    fn finish(&mut self) {
        let rank = self.player_rank();
        let time_bonus = TIME_BONUS_BASE.saturating_sub((self.race_time * 10.0).floor() as u64);
        let position_bonus = self.standing_factor(rank) * FINISH_POSITION_POINTS;
        self.score += time_bonus + position_bonus;

        let result = RaceResult {
            score: self.score,
            race_time: self.race_time,
            final_rank: rank,
        };
        self.result = Some(result);
        self.phase = RacePhase::Finished;
        self.events.push(RaceEvent::RaceFinished(result));

        log::info!(
            "Race finished: rank {}, score {}, time {:.2}s (time bonus {}, position bonus {})",
            rank,
            self.score,
            self.race_time,
            time_bonus,
            position_bonus
        );
    }
}

/// Demo driver: full throttle toward the path a little ahead
pub fn autopilot(car: &Car, track: &Track) -> DriveInput {
    let path = track.path();
    let Some(nearest) = track.nearest_point_on_path(car.pos) else {
        return DriveInput::default();
    };

    let target = path[(nearest.segment + AUTOPILOT_LOOKAHEAD) % path.len()];
    let to_target = target - car.pos;
    let error = angle_delta(car.heading, to_target.y.atan2(to_target.x));

    DriveInput {
        accelerate: true,
        brake: false,
        steer_left: error < -AUTOPILOT_DEADBAND,
        steer_right: error > AUTOPILOT_DEADBAND,
    }
}
