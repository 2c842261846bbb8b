//! Per-level high score table
//!
//! Persisted as a map of level number to best score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, KeyValueStore, StorageError};
use crate::sim::Level;

/// Best score on each level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    scores: BTreeMap<u8, u64>,
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new()
    }
}

impl HighScores {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "spaceRunnerHighScores";

    /// Every level at zero
    pub fn new() -> Self {
        Self {
            scores: Level::ALL.iter().map(|l| (l.number(), 0)).collect(),
        }
    }

    pub fn get(&self, level: Level) -> u64 {
        self.scores.get(&level.number()).copied().unwrap_or(0)
    }

    /// Check if a score would beat the stored best
    pub fn qualifies(&self, level: Level, score: u64) -> bool {
        score > self.get(level)
    }

    /// Store `score` if it beats the current best. Returns whether it did.
    pub fn record(&mut self, level: Level, score: u64) -> bool {
        if !self.qualifies(level, score) {
            return false;
        }
        self.scores.insert(level.number(), score);
        true
    }

    /// Best score across all levels (if any run has scored)
    pub fn top_score(&self) -> Option<(Level, u64)> {
        Level::ALL
            .iter()
            .map(|&l| (l, self.get(l)))
            .filter(|&(_, s)| s > 0)
            .max_by_key(|&(_, s)| s)
    }

    /// Load from storage, keeping defaults for levels the stored map lacks
    pub fn load(store: &impl KeyValueStore) -> Self {
        let stored: BTreeMap<u8, u64> = storage::load_json_or_default(store, Self::STORAGE_KEY);
        let mut scores = Self::new();
        for (number, score) in stored {
            match Level::from_number(number) {
                Some(level) => {
                    scores.scores.insert(level.number(), score);
                }
                None => log::warn!("Dropping high score for unknown level {}", number),
            }
        }
        log::info!("Loaded high scores: {:?}", scores.scores);
        scores
    }

    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        storage::save_json(store, Self::STORAGE_KEY, self)
    }
}
