//! Rendering collaborator
//!
//! The session drives a [`Renderer`] but never depends on how it draws.
//! Every hook has a no-op default so a backend only implements what it shows.

use glam::Vec3;

use crate::session::RunSummary;
use crate::settings::CameraMode;
use crate::sim::{Aabb, Character, GameState, Notice, Obstacle};

#[allow(unused_variables)]
pub trait Renderer {
    /// Build the runner model. `tint` is the equipped skin color, if any.
    fn spawn_player(&mut self, character: Character, size: Vec3, tint: Option<u32>) {}

    /// Build an obstacle group with its collider boxes at spawn time
    fn spawn_obstacle(&mut self, obstacle: &Obstacle, colliders: &[Aabb]) {}

    fn despawn_obstacle(&mut self, id: u32) {}

    /// Recolor the runner (crash feedback)
    fn tint_player(&mut self, color: u32) {}

    fn set_background(&mut self, color: u32) {}

    fn set_camera(&mut self, mode: CameraMode) {}

    fn show_fps(&mut self, visible: bool) {}

    /// Fire-and-forget toast; the backend times it out
    fn show_notice(&mut self, notice: &Notice) {}

    fn show_paused(&mut self, paused: bool) {}

    fn show_game_over(&mut self, summary: &RunSummary) {}

    /// Per-frame sync from simulation state. `time` is ms since page load.
    fn update(&mut self, state: &GameState, time: f64) {}

    /// Drop everything drawn for the current run
    fn clear(&mut self) {}
}

/// Draws nothing (headless runs and tests)
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records calls for session tests
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRenderer {
        pub player: Option<(Character, Option<u32>)>,
        pub obstacles: Vec<u32>,
        pub tint: Option<u32>,
        pub background: Option<u32>,
        pub camera: Option<CameraMode>,
        pub fps_visible: bool,
        pub notices: Vec<Notice>,
        pub paused: bool,
        pub game_over: Option<RunSummary>,
        pub frames: u32,
    }

    impl Renderer for RecordingRenderer {
        fn spawn_player(&mut self, character: Character, _size: Vec3, tint: Option<u32>) {
            self.player = Some((character, tint));
        }

        fn spawn_obstacle(&mut self, obstacle: &Obstacle, colliders: &[Aabb]) {
            assert_eq!(colliders.len(), obstacle.sizes.len());
            self.obstacles.push(obstacle.id);
        }

        fn despawn_obstacle(&mut self, id: u32) {
            self.obstacles.retain(|&o| o != id);
        }

        fn tint_player(&mut self, color: u32) {
            self.tint = Some(color);
        }

        fn set_background(&mut self, color: u32) {
            self.background = Some(color);
        }

        fn set_camera(&mut self, mode: CameraMode) {
            self.camera = Some(mode);
        }

        fn show_fps(&mut self, visible: bool) {
            self.fps_visible = visible;
        }

        fn show_notice(&mut self, notice: &Notice) {
            self.notices.push(*notice);
        }

        fn show_paused(&mut self, paused: bool) {
            self.paused = paused;
        }

        fn show_game_over(&mut self, summary: &RunSummary) {
            self.game_over = Some(summary.clone());
        }

        fn update(&mut self, _state: &GameState, _time: f64) {
            self.frames += 1;
        }

        fn clear(&mut self) {
            self.obstacles.clear();
            self.tint = None;
            self.paused = false;
            self.game_over = None;
        }
    }

    #[test]
    fn test_null_renderer_accepts_everything() {
        let mut renderer = NullRenderer;
        renderer.tint_player(0xd1201b);
        renderer.set_background(0);
        renderer.clear();
    }
}
