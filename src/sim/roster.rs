//! Playable characters and levels
//!
//! Unlocks chain together: clearing a level's unlock score opens the next
//! level and, the first time, the character bound to it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A selectable player object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Rocket,
    Asteroid,
    Planet,
}

impl Character {
    /// Menu cycling order
    pub const ALL: [Character; 3] = [Character::Rocket, Character::Asteroid, Character::Planet];

    /// Stable id used in persisted unlock lists
    pub fn id(&self) -> &'static str {
        match self {
            Character::Rocket => "rocket",
            Character::Asteroid => "asteroid",
            Character::Planet => "planet",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Character::Rocket => "Galaxy Cruiser",
            Character::Asteroid => "Rogue Asteroid",
            Character::Planet => "Wandering Saturn",
        }
    }

    /// Collider dimensions (width, height, depth)
    pub fn collider_size(&self) -> Vec3 {
        match self {
            Character::Rocket => Vec3::new(1.0, 1.0, 1.8),
            Character::Asteroid => Vec3::splat(1.2),
            Character::Planet => Vec3::splat(1.5),
        }
    }

    /// Level whose unlock grants this character (the rocket is always available)
    pub fn unlock_level(&self) -> Level {
        match self {
            Character::Rocket => Level::One,
            Character::Asteroid => Level::Two,
            Character::Planet => Level::Three,
        }
    }

    /// Whether the character owns the one-shot singularity ability
    pub fn has_singularity(&self) -> bool {
        matches!(self, Character::Planet)
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A selectable difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    One,
    Two,
    Three,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::One, Level::Two, Level::Three];

    /// 1-based level number, also the persisted map key
    pub fn number(&self) -> u8 {
        match self {
            Level::One => 1,
            Level::Two => 2,
            Level::Three => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Level::One),
            2 => Some(Level::Two),
            3 => Some(Level::Three),
            _ => None,
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.number() as usize - 1
    }

    /// Score that unlocks the next level while playing this one
    pub fn unlock_score(&self) -> Option<u64> {
        match self {
            Level::One | Level::Two => Some(1000),
            Level::Three => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    /// Character granted when this level is unlocked
    pub fn bound_character(&self) -> Option<Character> {
        Character::ALL
            .into_iter()
            .find(|c| c.unlock_level() == *self && *c != Character::Rocket)
    }

    /// Only the hardest level runs the internal stage machine
    pub fn has_stages(&self) -> bool {
        matches!(self, Level::Three)
    }
}
