//! Obstacle kinds and their motion
//!
//! Every kind is a fixed set of collider boxes around an anchor. Box motion is
//! a pure function of elapsed run time, so colliders can be recomputed for any
//! `t` without replaying earlier frames.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// Obstacle kinds, in unlock order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    AsteroidField,
    PlasmaShots,
    EnergyField,
    Ufo,
    QuantumGate,
}

const BEAM_SIZE: Vec3 = Vec3::new(0.4, 4.0, 0.4);
const PLASMA_SIZE: Vec3 = Vec3::splat(0.6);

/// Energy beams form three staggered gates
const BEAM_SLOTS: [(f32, f32); 6] = [
    (-4.0, -2.0),
    (-1.0, -2.0),
    (1.0, 0.0),
    (4.0, 0.0),
    (-4.0, 2.0),
    (-1.0, 2.0),
];

const QUANTUM_POSTS: usize = 8;

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::AsteroidField,
        ObstacleKind::PlasmaShots,
        ObstacleKind::EnergyField,
        ObstacleKind::Ufo,
        ObstacleKind::QuantumGate,
    ];

    /// Roll collider sizes at spawn time
    fn roll_sizes(&self, rng: &mut impl Rng) -> Vec<Vec3> {
        match self {
            ObstacleKind::AsteroidField => (0..4)
                .map(|_| {
                    Vec3::new(
                        rng.random_range(0.8..1.8),
                        rng.random_range(0.8..1.8),
                        rng.random_range(0.8..1.8),
                    )
                })
                .collect(),
            ObstacleKind::PlasmaShots => vec![PLASMA_SIZE; 3],
            ObstacleKind::EnergyField => vec![BEAM_SIZE; BEAM_SLOTS.len()],
            ObstacleKind::Ufo => vec![Vec3::new(3.0, 1.0, 3.0), Vec3::new(2.0, 1.5, 2.0)],
            ObstacleKind::QuantumGate => vec![BEAM_SIZE; QUANTUM_POSTS],
        }
    }

    /// Offset of box `i` from the group origin at time `t` (seconds)
    pub fn local_offset(&self, i: usize, t: f32) -> Vec3 {
        let fi = i as f32;
        match self {
            ObstacleKind::AsteroidField => {
                Vec3::new((fi - 2.0) * 2.0 + (t + fi).sin() * 2.5, 0.4, 0.0)
            }
            ObstacleKind::PlasmaShots => {
                let u = t * 1.5;
                Vec3::new(
                    (fi * 2.0 - 2.0) + (u + fi).sin() * 3.0,
                    0.3,
                    (u * 0.8 + fi).sin() * 2.0,
                )
            }
            ObstacleKind::EnergyField => {
                let (x, z) = BEAM_SLOTS[i % BEAM_SLOTS.len()];
                Vec3::new(x, 2.0, z)
            }
            ObstacleKind::Ufo => {
                if i == 0 {
                    Vec3::new(0.0, 0.5, 0.0)
                } else {
                    Vec3::new(0.0, 1.25, 0.0)
                }
            }
            ObstacleKind::QuantumGate => {
                let angle = fi / QUANTUM_POSTS as f32 * TAU + t * 0.5;
                Vec3::new(angle.cos() * 3.0, 2.0, angle.sin() * 3.0)
            }
        }
    }

    /// Group origin at time `t` given its spawn anchor
    pub fn group_position(&self, anchor: Vec3, t: f32) -> Vec3 {
        match self {
            // The saucer sweeps the whole lane regardless of its spawn offset
            ObstacleKind::Ufo => Vec3::new((t * 0.8).sin() * 4.0, anchor.y, anchor.z),
            _ => anchor,
        }
    }
}

/// Capture state of an obstacle with respect to the singularity ability
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tether {
    /// Following its kind's motion and dangerous
    Free,
    /// Held in orbit around the player
    Orbiting { slot: u32 },
    /// Thrown out of orbit, coasting to a stop
    Drifting { velocity: Vec3 },
    /// Released and at rest; no longer collidable
    Spent,
}

/// A live obstacle in the arena
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Spawn anchor (lateral offset, ground height, spawn z)
    pub anchor: Vec3,
    /// Collider sizes, fixed at spawn
    pub sizes: Vec<Vec3>,
    pub tether: Tether,
    /// Group origin while captured or released
    pub held_at: Option<Vec3>,
}

impl Obstacle {
    pub fn spawn(id: u32, kind: ObstacleKind, anchor: Vec3, rng: &mut impl Rng) -> Self {
        Self {
            id,
            kind,
            anchor,
            sizes: kind.roll_sizes(rng),
            tether: Tether::Free,
            held_at: None,
        }
    }

    /// Current group origin
    pub fn position(&self, t: f32) -> Vec3 {
        self.held_at
            .unwrap_or_else(|| self.kind.group_position(self.anchor, t))
    }

    /// World-space colliders at time `t`
    pub fn colliders_at(&self, t: f32) -> Vec<Aabb> {
        let origin = self.position(t);
        self.sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Aabb::new(origin + self.kind.local_offset(i, t), size))
            .collect()
    }

    /// Whether touching this obstacle ends the run
    pub fn is_armed(&self) -> bool {
        matches!(self.tether, Tether::Free)
    }

    /// Whether any collider at time `t` overlaps `target`
    pub fn hits(&self, target: &Aabb, t: f32) -> bool {
        self.is_armed() && self.colliders_at(t).iter().any(|c| c.intersects(target))
    }
}
