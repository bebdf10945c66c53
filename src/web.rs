//! Browser bridge
//!
//! The page owns rendering, audio and key capture. It forwards held actions
//! here, calls `tick` once per animation frame and reads back JSON.

use wasm_bindgen::prelude::*;

use crate::config::RaceConfig;
use crate::highscores::{DEFAULT_PLAYER_NAME, HighScores};
use crate::sim::{Action, Race, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier start
        return;
    }
    log::info!("Retro Racer starting...");
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A race driven from JavaScript
#[wasm_bindgen]
pub struct WebRace {
    race: Race,
    input: TickInput,
    high_scores: HighScores,
    player_name: String,
    recorded: bool,
}

#[wasm_bindgen]
impl WebRace {
    /// Start a race; `config_json` overrides the stored config
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, config_json: Option<String>) -> Result<WebRace, JsValue> {
        let config = match config_json {
            Some(json) => RaceConfig::from_json(&json).map_err(to_js)?,
            None => RaceConfig::load(),
        };
        let race = Race::new(config, seed).map_err(to_js)?;

        Ok(Self {
            race,
            input: TickInput::default(),
            high_scores: HighScores::load(),
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            recorded: false,
        })
    }

    /// Press or release a logical action by name; returns false for unknown names
    pub fn set_action(&mut self, name: &str, held: bool) -> bool {
        match Action::from_name(name) {
            Some(action) => {
                self.input.set(action, held);
                true
            }
            None => false,
        }
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.to_string();
    }

    /// Advance by `dt` seconds of wall time
    pub fn tick(&mut self, dt: f32) {
        tick(&mut self.race, &self.input, dt);

        // Pause and activation are edge-triggered
        self.input.pause = false;
        self.input.activate_power_up = false;

        if let Some(result) = self.race.result.filter(|_| !self.recorded) {
            self.recorded = true;
            if let Some(rank) =
                self.high_scores
                    .add_score(&self.player_name, &result, js_sys::Date::now())
            {
                log::info!("New high score, board position {}", rank);
                self.high_scores.save();
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.race.is_finished()
    }

    /// Current render view as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.race.snapshot()).map_err(to_js)
    }

    /// Events from the last tick as JSON
    pub fn events(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.race.events).map_err(to_js)
    }

    pub fn high_scores(&self) -> Result<String, JsValue> {
        self.high_scores.to_json().map_err(to_js)
    }

    /// Store the current race config as the default for new races
    pub fn save_config(&self) {
        self.race.config.save();
    }
}
