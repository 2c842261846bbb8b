//! Procedural obstacle placement
//!
//! The spawner keeps a single frontier along -z. Whenever the player comes
//! within the look-ahead distance of it, one more obstacle is placed beyond
//! it and the frontier moves on. Obstacles left far behind are evicted.

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::obstacle::{Obstacle, ObstacleKind};
use super::roster::Level;
use crate::consts::{INITIAL_SPAWN_Z, OBSTACLE_ANCHOR_Y};

/// Kinds offered for a level.
///
/// Level 1 gets the first two kinds, level 2 the first three, and the hardest
/// level opens one more kind per internal stage.
pub fn available_kinds(level: Level, internal_level: u8) -> &'static [ObstacleKind] {
    let count = match level {
        Level::One => 2,
        Level::Two => 3,
        Level::Three => (internal_level as usize + 1).min(ObstacleKind::ALL.len()),
    };
    &ObstacleKind::ALL[..count]
}

/// Spawn frontier state
#[derive(Debug, Clone)]
pub struct Spawner {
    /// z of the most recently placed obstacle (monotonically decreasing)
    pub last_spawn_z: f32,
    /// Base distance between obstacles
    pub interval: f32,
}

impl Spawner {
    pub fn new(interval: f32) -> Self {
        Self {
            last_spawn_z: INITIAL_SPAWN_Z,
            interval,
        }
    }

    /// Whether the player is close enough to the frontier to place another obstacle
    pub fn due(&self, player_z: f32, lookahead: f32) -> bool {
        player_z < self.last_spawn_z + lookahead
    }

    /// Pick the next kind and anchor, advancing the frontier.
    ///
    /// The gap is `interval` plus up to half of `jitter_span` either way.
    pub fn next(
        &mut self,
        kinds: &[ObstacleKind],
        jitter_span: f32,
        lateral_spread: f32,
        rng: &mut impl Rng,
    ) -> (ObstacleKind, Vec3) {
        let kind = kinds
            .choose(rng)
            .copied()
            .unwrap_or(ObstacleKind::AsteroidField);
        let gap = self.interval + (rng.random::<f32>() - 0.5) * jitter_span;
        let x = (rng.random::<f32>() - 0.5) * lateral_spread;
        self.last_spawn_z -= gap;
        (kind, Vec3::new(x, OBSTACLE_ANCHOR_Y, self.last_spawn_z))
    }
}

/// Drop obstacles more than `distance` behind the player; returns evicted ids
pub fn evict_passed(obstacles: &mut Vec<Obstacle>, player_z: f32, distance: f32, t: f32) -> Vec<u32> {
    let mut evicted = Vec::new();
    obstacles.retain(|o| {
        let keep = o.position(t).z <= player_z + distance;
        if !keep {
            evicted.push(o.id);
        }
        keep
    });
    evicted
}
