//! Per-frame simulation tick
//!
//! Order within a tick: input, physics, fall check, spawning, obstacle
//! collision, ground recycling, eviction, then progression.

use super::ability;
use super::progression::{self, Progress};
use super::spawner::evict_passed;
use super::state::{GameEvent, GameOverReason, GamePhase, GameState};
use crate::consts::CAMERA_TRAIL_Z;
use crate::tick_scale;

/// Horizontal steering held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Steer {
    #[default]
    None,
    Left,
    Right,
}

impl Steer {
    /// Resolve held keys; left wins when both are down
    pub fn from_keys(left: bool, right: bool) -> Self {
        if left {
            Steer::Left
        } else if right {
            Steer::Right
        } else {
            Steer::None
        }
    }

    fn sign(&self) -> f32 {
        match self {
            Steer::None => 0.0,
            Steer::Left => -1.0,
            Steer::Right => 1.0,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held steering direction
    pub steer: Steer,
    /// Jump pressed (one-shot)
    pub jump: bool,
    /// Special ability pressed (one-shot)
    pub ability: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Advance the run by one step of `dt` seconds
pub fn tick(state: &mut GameState, progress: &mut impl Progress, input: &TickInput, dt: f32) {
    // Pausing ends the tick; resuming runs it
    if input.pause && !state.pause() {
        state.resume();
    }

    if state.phase != GamePhase::Running {
        return;
    }

    let scale = tick_scale(dt);
    state.time_ticks += 1;
    state.elapsed += dt;

    if input.jump {
        state.events.push(GameEvent::JumpPressed);
        if state.player.on_ground {
            state.player.velocity.y = state.tuning.jump_velocity;
            state.events.push(GameEvent::Jumped);
        }
    }
    if input.ability {
        ability::activate(state);
    }

    state.player.velocity.x = input.steer.sign() * state.tuning.steer_speed;
    state.player.velocity.z = state.player_speed;
    let gravity = state.tuning.gravity;
    state.player.integrate(&state.grounds, gravity, scale);
    ability::advance(state, scale);

    if state.player.position.y < state.tuning.fall_limit_y {
        state.trigger_game_over(GameOverReason::FellOff);
    }

    if state.spawner.due(state.player.position.z, state.tuning.spawn_lookahead) {
        state.spawn_obstacle();
    }

    let t = state.elapsed;
    let collider = state.player.collider();
    if state.obstacles.iter().any(|o| o.hits(&collider, t)) {
        state.trigger_game_over(GameOverReason::Crashed);
    }

    recycle_grounds(state);

    let evicted = evict_passed(
        &mut state.obstacles,
        state.player.position.z,
        state.tuning.eviction_distance,
        t,
    );
    for id in evicted {
        log::debug!("Evicted obstacle #{}", id);
        state.events.push(GameEvent::ObstacleEvicted { id });
    }

    progression::update(state, progress);

    if !state.is_game_over() && state.level.has_stages() && state.internal_level >= 3 {
        state.player_speed += state.tuning.speed_creep * scale;
    }
}

/// Leapfrog ground segments the camera has fully passed
fn recycle_grounds(state: &mut GameState) {
    let camera_z = state.player.position.z + CAMERA_TRAIL_Z;
    let count = state.grounds.len() as f32;
    for ground in &mut state.grounds {
        if camera_z < ground.center.z - ground.size.z / 2.0 {
            ground.center.z -= count * ground.size.z;
        }
    }
}
