//! Simulation core
//!
//! All gameplay logic lives here. Rules for this module:
//! - One tick per repaint; per-tick deltas scale with `dt / SIM_DT`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod ability;
pub mod collision;
pub mod obstacle;
pub mod progression;
pub mod roster;
pub mod spawner;
pub mod state;
pub mod tick;

pub use ability::{Ripple, Singularity, SingularityPhase};
pub use collision::Aabb;
pub use obstacle::{Obstacle, ObstacleKind, Tether};
pub use progression::{Progress, score_for};
pub use roster::{Character, Level};
pub use spawner::{Spawner, available_kinds};
pub use state::{
    GameEvent, GameOverReason, GamePhase, GameState, Notice, PlayerState, RunSetup,
};
pub use tick::{Steer, TickInput, tick};
