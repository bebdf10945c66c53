//! High score leaderboard
//!
//! Persisted to LocalStorage, keeps the top 10 finished races.

use serde::{Deserialize, Serialize};

use crate::sim::RaceResult;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Name recorded when the player doesn't give one
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// A single finished race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    #[serde(default = "default_name")]
    pub name: String,
    pub score: u64,
    /// Seconds
    pub race_time: f32,
    /// 1-indexed finishing position
    pub final_rank: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

fn default_name() -> String {
    DEFAULT_PLAYER_NAME.to_string()
}

/// High score leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "retro_racer_highscores";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a finished race
    ///
    /// Ties go below earlier entries. Returns the board position (1-indexed)
    /// or None if the score didn't qualify.
    pub fn add_score(&mut self, name: &str, result: &RaceResult, timestamp: f64) -> Option<usize> {
        if !self.qualifies(result.score) {
            return None;
        }

        let name = name.trim();
        let entry = HighScoreEntry {
            name: if name.is_empty() {
                default_name()
            } else {
                name.to_string()
            },
            score: result.score,
            race_time: result.race_time,
            final_rank: result.final_rank,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| result.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("High score #{}: {} pts", rank, result.score);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse a stored board, re-sorting and trimming whatever was stored
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut scores: HighScores = serde_json::from_str(json)?;
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(scores) => {
                        log::info!("Loaded {} high scores", scores.entries.len());
                        return scores;
                    }
                    Err(e) => log::warn!("Discarding stored high scores: {}", e),
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Race time as `M:SS`
pub fn format_race_time(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u64) -> RaceResult {
        RaceResult {
            score,
            race_time: 95.5,
            final_rank: 2,
        }
    }

    #[test]
    fn test_entries_stay_sorted_and_capped() {
        let mut scores = HighScores::new();
        for (i, score) in [500, 9000, 1200, 300, 7000, 7000, 100, 50, 8000, 20, 10, 4000]
            .into_iter()
            .enumerate()
        {
            scores.add_score("Player", &result(score), i as f64);
        }

        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(9000));
        assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
        // 10 fell off the bottom
        assert!(scores.entries.iter().all(|e| e.score != 10));
    }

    #[test]
    fn test_ties_rank_below_existing() {
        let mut scores = HighScores::new();
        scores.add_score("First", &result(7000), 1.0);
        assert_eq!(scores.add_score("Second", &result(7000), 2.0), Some(2));
        assert_eq!(scores.entries[0].name, "First");
    }

    #[test]
    fn test_qualifies_when_full() {
        let mut scores = HighScores::new();
        for i in 1..=MAX_HIGH_SCORES as u64 {
            scores.add_score("Player", &result(i * 100), 0.0);
        }
        assert!(!scores.qualifies(100));
        assert!(scores.qualifies(101));
        assert_eq!(scores.potential_rank(1001), Some(1));
        assert_eq!(scores.potential_rank(50), None);
        assert_eq!(scores.add_score("Player", &result(0), 0.0), None);
    }

    #[test]
    fn test_entry_keeps_race_result() {
        let mut scores = HighScores::new();
        scores.add_score("  ", &result(4321), 1234.0);
        let entry = &scores.entries[0];
        assert_eq!(entry.name, DEFAULT_PLAYER_NAME);
        assert_eq!(entry.race_time, 95.5);
        assert_eq!(entry.final_rank, 2);
        assert_eq!(entry.timestamp, 1234.0);
    }

    #[test]
    fn test_json_round_trip_and_repair() {
        let mut scores = HighScores::new();
        scores.add_score("Ada", &result(2000), 1.0);
        scores.add_score("Bo", &result(3000), 2.0);
        let restored = HighScores::from_json(&scores.to_json().unwrap()).unwrap();
        assert_eq!(restored.entries, scores.entries);

        // Unsorted stored data without names
        let json = r#"{"entries":[
            {"score":10,"race_time":1.0,"final_rank":4,"timestamp":0.0},
            {"score":30,"race_time":1.0,"final_rank":1,"timestamp":0.0}
        ]}"#;
        let repaired = HighScores::from_json(json).unwrap();
        assert_eq!(repaired.top_score(), Some(30));
        assert_eq!(repaired.entries[1].name, DEFAULT_PLAYER_NAME);

        assert!(HighScores::from_json("not json").is_err());
    }

    #[test]
    fn test_format_race_time() {
        assert_eq!(format_race_time(0.0), "0:00");
        assert_eq!(format_race_time(65.9), "1:05");
        assert_eq!(format_race_time(600.0), "10:00");
        assert_eq!(format_race_time(-3.0), "0:00");
    }
}
