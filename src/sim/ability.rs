//! The planet's one-shot singularity
//!
//! Activation pulls nearby obstacles into a harmless orbit, holds them for a
//! few seconds, then flings them away. All timing is counted in ticks and
//! advanced by the main tick, so ordering stays deterministic.

use glam::Vec3;
use rand::Rng;

use super::obstacle::Tether;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Expanding ring drawn around the player on activation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub scale: f32,
    pub opacity: f32,
}

impl Ripple {
    fn new() -> Self {
        Self {
            scale: 1.0,
            opacity: 0.5,
        }
    }

    /// Returns false once the ripple has faded out
    fn advance(&mut self, scale: f32) -> bool {
        self.scale += 0.1 * scale;
        self.opacity -= 0.01 * scale;
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SingularityPhase {
    #[default]
    Ready,
    /// Obstacles in orbit; ticks remaining before release
    Holding { ticks_left: f32 },
    Spent,
}

#[derive(Debug, Clone, Default)]
pub struct Singularity {
    pub phase: SingularityPhase,
    pub ripple: Option<Ripple>,
}

impl Singularity {
    /// Whether the ability has been used this run
    pub fn is_used(&self) -> bool {
        self.phase != SingularityPhase::Ready
    }
}

/// Try to fire the ability; returns the number of captured obstacles.
///
/// Only the planet may use it, once per run, while the run is live.
pub fn activate(state: &mut GameState) -> Option<usize> {
    if state.phase != GamePhase::Running
        || !state.character().has_singularity()
        || state.singularity.is_used()
    {
        return None;
    }

    let t = state.elapsed;
    let center = state.player.position;
    let mut captured = 0u32;
    for obstacle in state.obstacles.iter_mut().filter(|o| o.is_armed()) {
        if obstacle.position(t).distance(center) < SINGULARITY_RADIUS {
            obstacle.tether = Tether::Orbiting { slot: captured };
            obstacle.held_at = Some(orbit_position(center, t, captured));
            captured += 1;
        }
    }

    state.singularity.phase = SingularityPhase::Holding {
        ticks_left: SINGULARITY_HOLD_TICKS as f32,
    };
    state.singularity.ripple = Some(Ripple::new());
    log::info!("Singularity captured {} obstacles", captured);
    state.events.push(GameEvent::SingularityActivated {
        captured: captured as usize,
    });
    Some(captured as usize)
}

fn orbit_position(center: Vec3, t: f32, slot: u32) -> Vec3 {
    let angle = t + slot as f32;
    center + Vec3::new(angle.cos() * ORBIT_RADIUS, ORBIT_HEIGHT, angle.sin() * ORBIT_RADIUS)
}

/// Advance orbit, release and drift by one step
pub fn advance(state: &mut GameState, scale: f32) {
    if let Some(ripple) = state.singularity.ripple.as_mut() {
        if !ripple.advance(scale) {
            state.singularity.ripple = None;
        }
    }

    let t = state.elapsed;
    let center = state.player.position;

    if let SingularityPhase::Holding { ticks_left } = state.singularity.phase {
        let ticks_left = ticks_left - scale;
        if ticks_left > 0.0 {
            state.singularity.phase = SingularityPhase::Holding { ticks_left };
            for obstacle in &mut state.obstacles {
                if let Tether::Orbiting { slot } = obstacle.tether {
                    obstacle.held_at = Some(orbit_position(center, t, slot));
                }
            }
        } else {
            release(state);
        }
    }

    for obstacle in &mut state.obstacles {
        if let Tether::Drifting { velocity } = obstacle.tether {
            let held = obstacle.held_at.unwrap_or(obstacle.anchor);
            obstacle.held_at = Some(held + velocity * scale);
            let velocity = velocity * RELEASE_DRAG.powf(scale);
            obstacle.tether = if velocity.length() > RELEASE_STOP_SPEED {
                Tether::Drifting { velocity }
            } else {
                Tether::Spent
            };
        }
    }
}

fn release(state: &mut GameState) {
    let rng = &mut state.rng;
    for obstacle in &mut state.obstacles {
        if let Tether::Orbiting { .. } = obstacle.tether {
            let push = Vec3::new(rng.random::<f32>() - 0.5, 0.0, rng.random::<f32>() - 0.5)
                .normalize_or(Vec3::X)
                * RELEASE_SPEED;
            obstacle.tether = Tether::Drifting { velocity: push };
        }
    }
    state.singularity.phase = SingularityPhase::Spent;
    state.events.push(GameEvent::SingularityReleased);
}
