//! Space Runner - an endless runner through deep space
//!
//! Core modules:
//! - `sim`: Simulation core (physics, collisions, spawning, progression)
//! - `session`: Run lifecycle controller driving the frame loop
//! - `persistence`: Write-through profile store (unlocks, high scores, quests, currency)
//! - `quests`: Daily objectives evaluated against run telemetry
//! - `shop`: Cosmetic skins bought with quest currency
//! - `platform`: Browser/native platform abstraction
//! - `renderer`: Drawing collaborator contract
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod quests;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod shop;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use persistence::ProfileStore;
pub use session::{GameSession, RunSummary};
pub use settings::{CameraMode, Settings};
pub use tuning::Tuning;

/// Game configuration constants
///
/// All per-tick values assume the 60 Hz repaint the game was tuned against.
pub mod consts {
    /// Fixed simulation timestep (one repaint at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Player physics (units per tick)
    pub const GRAVITY: f32 = -0.004;
    pub const JUMP_VELOCITY: f32 = 0.12;
    pub const STEER_SPEED: f32 = 0.05;
    /// Below this height the player has fallen into deep space
    pub const FALL_LIMIT_Y: f32 = -10.0;

    /// Ground segments
    pub const GROUND_COUNT: usize = 2;
    pub const GROUND_WIDTH: f32 = 10.0;
    pub const GROUND_HEIGHT: f32 = 0.5;
    pub const GROUND_DEPTH: f32 = 200.0;
    pub const GROUND_Y: f32 = -2.0;
    /// Third-person camera trails the player by this much along z
    pub const CAMERA_TRAIL_Z: f32 = 8.0;

    /// Obstacle spawning
    pub const INITIAL_SPAWN_Z: f32 = -20.0;
    pub const INITIAL_OBSTACLES: usize = 8;
    pub const SPAWN_LOOKAHEAD: f32 = 100.0;
    pub const SPAWN_JITTER_SPAN: f32 = 15.0;
    pub const LATERAL_SPREAD: f32 = 3.0;
    pub const OBSTACLE_ANCHOR_Y: f32 = -1.75;
    /// Obstacles this far behind the player are evicted
    pub const EVICTION_DISTANCE: f32 = 30.0;

    /// Hardest level: per-tick forward speed creep
    pub const SPEED_CREEP: f32 = -0.000_001;

    /// Singularity ability
    pub const SINGULARITY_RADIUS: f32 = 8.0;
    pub const SINGULARITY_HOLD_TICKS: u32 = 180;
    pub const ORBIT_RADIUS: f32 = 3.0;
    pub const ORBIT_HEIGHT: f32 = 2.0;
    pub const RELEASE_SPEED: f32 = 0.5;
    pub const RELEASE_DRAG: f32 = 0.95;
    pub const RELEASE_STOP_SPEED: f32 = 0.01;

    /// Crash tint applied to the player model on game over
    pub const CRASH_TINT: u32 = 0xd1_20_1b;
}

/// Fraction of a 60 Hz tick covered by `dt` seconds
#[inline]
pub fn tick_scale(dt: f32) -> f32 {
    dt / consts::SIM_DT
}
