//! Race state and core simulation types
//!
//! Everything a single race owns lives in [`Race`]. The controller in
//! `tick` is the only writer of cross-entity state (laps, score, phase).

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::car::{Car, CarRole};
use super::powerup::{PowerUp, PowerUpField, PowerUpKind, TimedPowerUp};
use super::track::{Track, TrackError};
use crate::config::RaceConfig;
use crate::consts::*;

/// Current phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Cars are moving
    Racing,
    /// Race is paused
    Paused,
    /// Final lap closed; terminal
    Finished,
}

/// What a checkpoint update did to a car's lap progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointOutcome {
    Unchanged,
    /// Reached a checkpoint other than the start line
    Advanced { index: usize },
    /// First arrival back at checkpoint 0; arms lap counting
    StartLineCrossed,
    /// Closed a lap; `lap` is the new lap number
    LapCompleted { lap: u32 },
    /// Closed the final lap
    Finished,
}

/// Lap and checkpoint bookkeeping for one car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapProgress {
    /// 1-indexed
    pub lap: u32,
    pub current_checkpoint: usize,
    /// Set on the first return to checkpoint 0; laps only count after it
    pub has_passed_start_line: bool,
    pub finished: bool,
}

impl Default for LapProgress {
    fn default() -> Self {
        Self {
            lap: 1,
            current_checkpoint: 0,
            has_passed_start_line: false,
            finished: false,
        }
    }
}

impl LapProgress {
    /// Apply the checkpoint index returned by `Track::advance_checkpoint`
    pub fn record_checkpoint(&mut self, checkpoint: usize, max_laps: u32) -> CheckpointOutcome {
        if self.finished || checkpoint == self.current_checkpoint {
            return CheckpointOutcome::Unchanged;
        }

        // Decided before touching the flag so the first return only arms it
        let closes_lap = checkpoint == 0 && self.has_passed_start_line;
        self.current_checkpoint = checkpoint;

        if checkpoint != 0 {
            return CheckpointOutcome::Advanced { index: checkpoint };
        }

        if !closes_lap {
            self.has_passed_start_line = true;
            return CheckpointOutcome::StartLineCrossed;
        }

        if self.lap >= max_laps {
            self.finished = true;
            CheckpointOutcome::Finished
        } else {
            self.lap += 1;
            CheckpointOutcome::LapCompleted { lap: self.lap }
        }
    }
}

/// Final standing handed to the high-score ledger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub score: u64,
    /// Seconds
    pub race_time: f32,
    /// 1-indexed
    pub final_rank: u32,
}

/// Discrete notifications for the audio/HUD collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum RaceEvent {
    Countdown,
    RaceStart,
    /// Player bumped an AI car
    Collision,
    PowerUpCollected(PowerUpKind),
    PowerUpActivated(PowerUpKind),
    CheckpointPassed(usize),
    StartLineCrossed,
    LapCompleted { lap: u32 },
    RaceFinished(RaceResult),
}

/// An event due once the race clock reaches `delay`
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledCue {
    pub delay: f32,
    pub event: RaceEvent,
}

/// Clock-driven cue list, fired in order
#[derive(Debug, Clone)]
pub struct CueSchedule {
    cues: Vec<ScheduledCue>,
    next: usize,
}

impl CueSchedule {
    /// Cues must be sorted by delay
    pub fn new(cues: Vec<ScheduledCue>) -> Self {
        Self { cues, next: 0 }
    }

    /// Two countdown beeps then the start signal
    pub fn countdown() -> Self {
        Self::new(vec![
            ScheduledCue {
                delay: 0.5,
                event: RaceEvent::Countdown,
            },
            ScheduledCue {
                delay: 1.5,
                event: RaceEvent::Countdown,
            },
            ScheduledCue {
                delay: 2.5,
                event: RaceEvent::RaceStart,
            },
        ])
    }

    /// Take every not-yet-fired cue whose delay has elapsed
    pub fn fire_due(&mut self, clock: f32) -> Vec<ScheduledCue> {
        let start = self.next;
        while self.cues.get(self.next).is_some_and(|cue| cue.delay <= clock) {
            self.next += 1;
        }
        self.cues[start..self.next].to_vec()
    }

    pub fn is_done(&self) -> bool {
        self.next >= self.cues.len()
    }
}

impl Default for CueSchedule {
    fn default() -> Self {
        Self::countdown()
    }
}

/// One race: track, cars, pickups and the player's standing
#[derive(Debug, Clone)]
pub struct Race {
    pub config: RaceConfig,
    pub track: Track,
    pub player: Car,
    /// Stable order
    pub ai_cars: Vec<Car>,
    pub power_ups: PowerUpField,
    /// The race's lap count; ranking credits every car with this lap
    pub player_progress: LapProgress,
    /// Seconds since the race was created (drives the cues)
    pub clock: f32,
    /// Seconds since the start signal; counts from creation until it fires
    pub race_time: f32,
    pub score: u64,
    /// Collected but not yet activated
    pub held_power_up: Option<TimedPowerUp>,
    pub phase: RacePhase,
    /// Camera target for the renderer
    pub camera: Vec2,
    pub cues: CueSchedule,
    /// Events raised by the most recent tick
    pub events: Vec<RaceEvent>,
    /// Set once the race finishes
    pub result: Option<RaceResult>,
    pub seed: u64,
}

impl Race {
    /// Set up a race on the configured oval
    pub fn new(config: RaceConfig, seed: u64) -> Result<Self, TrackError> {
        let track = Track::oval(&config.track)?;
        Ok(Self::with_track(config, track, seed))
    }

    /// Set up a race on a prebuilt track
    ///
    /// The player sits on the start line. AI cars fan out around it and
    /// each chases a different stretch of the path.
    pub fn with_track(config: RaceConfig, track: Track, seed: u64) -> Self {
        let start = track.start_pos();
        let heading = track.start_heading();
        let player = Car::new(0, CarRole::Player, start, heading, &config.player);

        let ai_spec = config.effective_ai();
        let count = config.num_ai_cars;
        let ai_cars: Vec<Car> = (0..count)
            .map(|i| {
                let angle = (i + 1) as f32 * TAU / (count + 1) as f32;
                let pos = start + Vec2::from_angle(angle) * AI_GRID_OFFSET;
                let mut car = Car::new(i as u32 + 1, CarRole::Ai, pos, heading, &ai_spec);
                car.target_waypoint = track.path().len() * i / count;
                car
            })
            .collect();

        log::info!(
            "New race: seed {}, {} AI ({}), {} laps",
            seed,
            count,
            config.difficulty.as_str(),
            config.max_laps
        );

        Self {
            power_ups: PowerUpField::new(&config.power_ups, seed),
            player_progress: LapProgress::default(),
            camera: player.pos,
            player,
            ai_cars,
            track,
            config,
            clock: 0.0,
            race_time: 0.0,
            score: 0,
            held_power_up: None,
            phase: RacePhase::Racing,
            cues: CueSchedule::countdown(),
            events: Vec::new(),
            result: None,
            seed,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    /// Read-only view for the renderer
    pub fn snapshot(&self) -> RaceSnapshot<'_> {
        RaceSnapshot {
            phase: self.phase,
            race_time: self.race_time,
            lap: self.player_progress.lap,
            max_laps: self.config.max_laps,
            current_checkpoint: self.player_progress.current_checkpoint,
            rank: self.player_rank(),
            score: self.score,
            held_power_up: self.held_power_up,
            camera: self.camera,
            track: &self.track,
            player: &self.player,
            ai_cars: &self.ai_cars,
            power_ups: self.power_ups.power_ups(),
            result: self.result,
        }
    }
}

/// Borrowed render view of a [`Race`]
#[derive(Debug, Serialize)]
pub struct RaceSnapshot<'a> {
    pub phase: RacePhase,
    pub race_time: f32,
    pub lap: u32,
    pub max_laps: u32,
    pub current_checkpoint: usize,
    pub rank: u32,
    pub score: u64,
    pub held_power_up: Option<TimedPowerUp>,
    pub camera: Vec2,
    pub track: &'a Track,
    pub player: &'a Car,
    pub ai_cars: &'a [Car],
    pub power_ups: &'a [PowerUp],
    pub result: Option<RaceResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::square_track;

    #[test]
    fn test_first_return_only_arms_lap_counting() {
        let mut progress = LapProgress::default();
        assert_eq!(progress.record_checkpoint(0, 3), CheckpointOutcome::Unchanged);

        for cp in 1..4 {
            assert_eq!(
                progress.record_checkpoint(cp, 3),
                CheckpointOutcome::Advanced { index: cp }
            );
        }
        assert_eq!(
            progress.record_checkpoint(0, 3),
            CheckpointOutcome::StartLineCrossed
        );
        assert_eq!(progress.lap, 1);
        assert!(progress.has_passed_start_line);

        for cp in 1..4 {
            progress.record_checkpoint(cp, 3);
        }
        assert_eq!(
            progress.record_checkpoint(0, 3),
            CheckpointOutcome::LapCompleted { lap: 2 }
        );
        assert_eq!(progress.lap, 2);
    }

    #[test]
    fn test_final_lap_finishes_and_freezes() {
        let mut progress = LapProgress {
            lap: 3,
            current_checkpoint: 3,
            has_passed_start_line: true,
            finished: false,
        };
        assert_eq!(progress.record_checkpoint(0, 3), CheckpointOutcome::Finished);
        assert!(progress.finished);
        assert_eq!(progress.lap, 3);

        assert_eq!(progress.record_checkpoint(1, 3), CheckpointOutcome::Unchanged);
        assert_eq!(progress.current_checkpoint, 0);
    }

    #[test]
    fn test_cues_fire_once_in_order() {
        let mut cues = CueSchedule::countdown();
        let events = |cues: Vec<ScheduledCue>| -> Vec<RaceEvent> {
            cues.into_iter().map(|c| c.event).collect()
        };

        assert!(cues.fire_due(0.4).is_empty());
        assert_eq!(
            events(cues.fire_due(1.6)),
            vec![RaceEvent::Countdown, RaceEvent::Countdown]
        );
        assert!(cues.fire_due(1.7).is_empty());

        let last = cues.fire_due(10.0);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].delay, 2.5);
        assert_eq!(last[0].event, RaceEvent::RaceStart);
        assert!(cues.is_done());
        assert!(cues.fire_due(20.0).is_empty());
    }

    #[test]
    fn test_race_setup() {
        let race = Race::new(RaceConfig::default(), 1).unwrap();
        assert_eq!(race.ai_cars.len(), NUM_AI_CARS);
        assert_eq!(race.player.pos, race.track.start_pos());
        assert_eq!(race.player_progress.lap, 1);
        assert_eq!(race.phase, RacePhase::Racing);

        for (i, car) in race.ai_cars.iter().enumerate() {
            assert_eq!(car.role, CarRole::Ai);
            assert!((car.pos.distance(race.player.pos) - AI_GRID_OFFSET).abs() < 1e-3);
            assert_eq!(car.target_waypoint, TRACK_SEGMENTS * i / NUM_AI_CARS);
        }
    }

    #[test]
    fn test_race_rejects_bad_track_config() {
        let mut config = RaceConfig::default();
        config.track.segments = 2;
        assert!(matches!(
            Race::new(config, 1),
            Err(TrackError::TooFewWaypoints(2))
        ));
    }

    #[test]
    fn test_snapshot_serializes() {
        let race = Race::with_track(RaceConfig::default(), square_track(), 5);
        let json = serde_json::to_value(race.snapshot()).unwrap();
        assert_eq!(json["lap"], 1);
        assert_eq!(json["phase"], "Racing");
        assert_eq!(json["ai_cars"].as_array().unwrap().len(), NUM_AI_CARS);
        assert_eq!(json["track"]["path"].as_array().unwrap().len(), 4);

        let event = serde_json::to_value(RaceEvent::LapCompleted { lap: 2 }).unwrap();
        assert_eq!(event["type"], "LapCompleted");
        assert_eq!(event["data"]["lap"], 2);
    }
}
