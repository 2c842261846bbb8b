//! Data-driven game balance
//!
//! Defaults reproduce the hand-tuned 60 Hz feel. A JSON document may override
//! any subset of fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::roster::Level;

/// Per-level run parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelTuning {
    /// Forward velocity along z (negative = away from the camera)
    pub player_speed: f32,
    /// Base distance between consecutive obstacles
    pub spawn_interval: f32,
    /// Scene background color (0xRRGGBB)
    pub background: u32,
}

/// A stage of the hardest level, reached by score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTuning {
    /// Internal level value this stage moves to
    pub internal_level: u8,
    /// Score needed to enter the stage
    pub score: u64,
    /// Added to forward speed when the stage is entered
    pub speed_delta: f32,
    /// Spawn interval from this stage on
    pub spawn_interval: f32,
}

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected {expected} level entries, found {found}")]
    LevelCount { expected: usize, found: usize },
    #[error("level {level} must move forward (player_speed {speed} is not negative)")]
    Stationary { level: u8, speed: f32 },
    #[error("spawn interval {interval} must exceed half the jitter span {jitter}")]
    IntervalTooShort { interval: f32, jitter: f32 },
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub jump_velocity: f32,
    pub steer_speed: f32,
    pub fall_limit_y: f32,
    /// Indexed by level number - 1
    pub levels: Vec<LevelTuning>,
    /// Hardest-level stages, in ascending score order
    pub stages: Vec<StageTuning>,
    pub speed_creep: f32,
    pub spawn_lookahead: f32,
    pub spawn_jitter_span: f32,
    pub lateral_spread: f32,
    pub eviction_distance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            steer_speed: STEER_SPEED,
            fall_limit_y: FALL_LIMIT_Y,
            levels: vec![
                LevelTuning {
                    player_speed: -0.08,
                    spawn_interval: 25.0,
                    background: 0x01_01_03,
                },
                LevelTuning {
                    player_speed: -0.12,
                    spawn_interval: 22.0,
                    background: 0x0c_0a_1f,
                },
                LevelTuning {
                    player_speed: -0.16,
                    spawn_interval: 18.0,
                    background: 0x1d_0b_30,
                },
            ],
            stages: vec![
                StageTuning {
                    internal_level: 4,
                    score: 4000,
                    speed_delta: -0.01,
                    spawn_interval: 16.0,
                },
                StageTuning {
                    internal_level: 5,
                    score: 7000,
                    speed_delta: -0.01,
                    spawn_interval: 14.0,
                },
            ],
            speed_creep: SPEED_CREEP,
            spawn_lookahead: SPAWN_LOOKAHEAD,
            spawn_jitter_span: SPAWN_JITTER_SPAN,
            lateral_spread: LATERAL_SPREAD,
            eviction_distance: EVICTION_DISTANCE,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from JSON, falling back to defaults (with a warning) on any error
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning override: {}", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.levels.len() != Level::ALL.len() {
            return Err(TuningError::LevelCount {
                expected: Level::ALL.len(),
                found: self.levels.len(),
            });
        }
        for (level, lt) in Level::ALL.iter().zip(&self.levels) {
            if lt.player_speed >= 0.0 {
                return Err(TuningError::Stationary {
                    level: level.number(),
                    speed: lt.player_speed,
                });
            }
        }
        let intervals = self
            .levels
            .iter()
            .map(|l| l.spawn_interval)
            .chain(self.stages.iter().map(|s| s.spawn_interval));
        for interval in intervals {
            if interval <= self.spawn_jitter_span / 2.0 {
                return Err(TuningError::IntervalTooShort {
                    interval,
                    jitter: self.spawn_jitter_span,
                });
            }
        }
        Ok(())
    }

    /// Parameters for a level
    pub fn level(&self, level: Level) -> LevelTuning {
        self.levels[level.index()]
    }

    /// The stage entered when advancing to `internal_level`, if any
    pub fn stage(&self, internal_level: u8) -> Option<&StageTuning> {
        self.stages
            .iter()
            .find(|s| s.internal_level == internal_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.level(Level::One).spawn_interval, 25.0);
        assert_eq!(tuning.level(Level::Three).player_speed, -0.16);
        assert_eq!(tuning.stage(4).map(|s| s.score), Some(4000));
        assert!(tuning.stage(6).is_none());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": -0.005 }"#).unwrap();
        assert_eq!(tuning.gravity, -0.005);
        assert_eq!(tuning.jump_velocity, JUMP_VELOCITY);
        assert_eq!(tuning.levels.len(), 3);
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "levels": [] }"#),
            Err(TuningError::LevelCount { found: 0, .. })
        ));

        let mut tuning = Tuning::default();
        tuning.levels[1].player_speed = 0.1;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Stationary { level: 2, .. })
        ));

        let mut tuning = Tuning::default();
        tuning.stages[0].spawn_interval = 5.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::IntervalTooShort { .. })
        ));
    }

    #[test]
    fn test_fallback_on_error() {
        assert_eq!(Tuning::from_json_or_default("{"), Tuning::default());
    }
}
