//! Race configuration
//!
//! Static inputs to race construction: track shape, car tuning, power-up
//! cadence, lap count and AI difficulty. Persisted separately from high
//! scores in LocalStorage on the web; every field falls back to its default
//! when missing from stored JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{Track, TrackError};

/// Failure loading or applying a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid track: {0}")]
    Track(#[from] TrackError),
}

/// AI skill presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AiDifficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl AiDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiDifficulty::Easy => "Easy",
            AiDifficulty::Normal => "Normal",
            AiDifficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(AiDifficulty::Easy),
            "normal" | "medium" => Some(AiDifficulty::Normal),
            "hard" => Some(AiDifficulty::Hard),
            _ => None,
        }
    }

    /// Cycle forward (menu toggle)
    pub fn next(self) -> Self {
        match self {
            AiDifficulty::Easy => AiDifficulty::Normal,
            AiDifficulty::Normal => AiDifficulty::Hard,
            AiDifficulty::Hard => AiDifficulty::Easy,
        }
    }

    /// Multiplier on AI top speed
    pub fn speed_factor(&self) -> f32 {
        match self {
            AiDifficulty::Easy => 0.85,
            AiDifficulty::Normal => 1.0,
            AiDifficulty::Hard => 1.15,
        }
    }
}

/// Physical tuning for one kind of car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSpec {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Radians per second
    pub turn_rate: f32,
    /// Speed retained per 60 Hz frame while coasting
    pub friction: f32,
    pub width: f32,
    pub height: f32,
}

impl CarSpec {
    pub fn player() -> Self {
        Self {
            max_speed: PLAYER_MAX_SPEED,
            acceleration: CAR_ACCELERATION,
            deceleration: CAR_DECELERATION,
            turn_rate: CAR_TURN_RATE,
            friction: CAR_FRICTION,
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
        }
    }

    pub fn ai() -> Self {
        Self {
            max_speed: AI_MAX_SPEED,
            ..Self::player()
        }
    }
}

impl Default for CarSpec {
    fn default() -> Self {
        Self::player()
    }
}

/// Oval track shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub radius_x: f32,
    pub radius_y: f32,
    /// Number of waypoints around the loop
    pub segments: usize,
    pub checkpoints: usize,
    pub width: f32,
    pub boundary_width: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            radius_x: TRACK_RADIUS_X,
            radius_y: TRACK_RADIUS_Y,
            segments: TRACK_SEGMENTS,
            checkpoints: TRACK_CHECKPOINTS,
            width: TRACK_WIDTH,
            boundary_width: TRACK_BOUNDARY_WIDTH,
        }
    }
}

/// Power-up spawning and effect durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Seconds between spawns
    pub spawn_interval: f32,
    pub max_power_ups: usize,
    pub radius: f32,
    /// How long a pickup stays held and how long its effect runs
    pub duration: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            spawn_interval: POWER_UP_SPAWN_INTERVAL,
            max_power_ups: MAX_POWER_UPS,
            radius: POWER_UP_RADIUS,
            duration: POWER_UP_DURATION,
        }
    }
}

/// Everything needed to set up a race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub max_laps: u32,
    pub num_ai_cars: usize,
    pub difficulty: AiDifficulty,
    pub track: TrackConfig,
    pub power_ups: PowerUpConfig,
    pub player: CarSpec,
    pub ai: CarSpec,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            max_laps: MAX_LAPS,
            num_ai_cars: NUM_AI_CARS,
            difficulty: AiDifficulty::default(),
            track: TrackConfig::default(),
            power_ups: PowerUpConfig::default(),
            player: CarSpec::player(),
            ai: CarSpec::ai(),
        }
    }
}

impl RaceConfig {
    /// AI car tuning with the difficulty multiplier applied
    pub fn effective_ai(&self) -> CarSpec {
        CarSpec {
            max_speed: self.ai.max_speed * self.difficulty.speed_factor(),
            ..self.ai
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file (native runner)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check that the configured track can actually be built
    pub fn validate(&self) -> Result<(), ConfigError> {
        Track::oval(&self.track)?;
        Ok(())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "retro_racer_config";

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded race config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {}", e),
                }
            }
        }

        log::info!("Using default race config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Race config saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
