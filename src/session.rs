//! Run lifecycle controller
//!
//! [`GameSession`] owns the profile, the renderer and at most one live run.
//! It handles menu selection, turns key events into tick input, runs the
//! fixed-step frame loop and routes simulation events to quests, the renderer
//! and the end-of-run summary.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{CRASH_TINT, MAX_SUBSTEPS, SIM_DT};
use crate::persistence::ProfileStore;
use crate::platform::storage::KeyValueStore;
use crate::platform::{InputAction, InputState, time};
use crate::renderer::Renderer;
use crate::sim::{
    Character, GameEvent, GameOverReason, GameState, Level, Notice, Progress, RunSetup, tick,
};
use crate::tuning::Tuning;

/// Which screen is up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Shop,
    Quests,
    Playing,
    GameOver,
}

/// What the game-over screen offers to play next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    PlayLevelWith(Level, Character),
    PlayLevel(Level),
    TryCharacter(Character),
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub reason: GameOverReason,
    pub score: u64,
    pub level: Level,
    pub high_score: u64,
    pub newly_unlocked_level: Option<Level>,
    pub newly_unlocked_character: Option<Character>,
    pub follow_up: Option<FollowUp>,
}

impl RunSummary {
    fn new(state: &GameState, reason: GameOverReason, high_score: u64) -> Self {
        let level = state.newly_unlocked_level;
        let character = state.newly_unlocked_character;
        let follow_up = match (level, character) {
            (Some(l), Some(c)) => Some(FollowUp::PlayLevelWith(l, c)),
            (Some(l), None) => Some(FollowUp::PlayLevel(l)),
            (None, Some(c)) => Some(FollowUp::TryCharacter(c)),
            (None, None) => None,
        };
        Self {
            reason,
            score: state.score,
            level: state.level,
            high_score,
            newly_unlocked_level: level,
            newly_unlocked_character: character,
            follow_up,
        }
    }

    /// Unlock lines for the game-over screen
    pub fn unlock_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(level) = self.newly_unlocked_level {
            messages.push(Notice::LevelUnlocked(level).message());
        }
        if let Some(character) = self.newly_unlocked_character {
            messages.push(Notice::CharacterUnlocked(character).message());
        }
        messages
    }
}

pub struct GameSession<S: KeyValueStore, R: Renderer> {
    profile: ProfileStore<S>,
    renderer: R,
    tuning: Tuning,
    /// Seeds runs and quest rolls
    rng: Pcg32,
    selected_level: Level,
    selected_character: Character,
    screen: Screen,
    input: InputState,
    state: Option<GameState>,
    summary: Option<RunSummary>,
    accumulator: f32,
}

impl<S: KeyValueStore, R: Renderer> GameSession<S, R> {
    pub fn new(profile: ProfileStore<S>, mut renderer: R, tuning: Tuning, seed: u64) -> Self {
        renderer.set_camera(profile.settings().camera);
        renderer.show_fps(profile.settings().show_fps);
        Self {
            profile,
            renderer,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            selected_level: Level::One,
            selected_character: Character::Rocket,
            screen: Screen::Menu,
            input: InputState::new(),
            state: None,
            summary: None,
            accumulator: 0.0,
        }
    }

    pub fn profile(&self) -> &ProfileStore<S> {
        &self.profile
    }

    /// Shop, quest claims and settings go through the profile
    pub fn profile_mut(&mut self) -> &mut ProfileStore<S> {
        &mut self.profile
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selected_level(&self) -> Level {
        self.selected_level
    }

    pub fn selected_character(&self) -> Character {
        self.selected_character
    }

    pub fn is_selected_character_unlocked(&self) -> bool {
        self.profile.is_character_unlocked(self.selected_character)
    }

    fn in_menus(&self) -> bool {
        matches!(self.screen, Screen::Menu | Screen::Shop | Screen::Quests)
    }

    // === Menu ===

    /// Choose a level; locked levels are refused
    pub fn select_level(&mut self, level: Level) -> bool {
        if !self.in_menus() || !self.profile.is_level_unlocked(level) {
            return false;
        }
        self.selected_level = level;
        true
    }

    /// Cycle the character preview (locked characters can be previewed)
    pub fn next_character(&mut self) -> Character {
        self.selected_character = self.selected_character.next();
        self.selected_character
    }

    pub fn prev_character(&mut self) -> Character {
        self.selected_character = self.selected_character.prev();
        self.selected_character
    }

    pub fn toggle_shop(&mut self) -> Screen {
        self.screen = match self.screen {
            Screen::Menu | Screen::Quests => Screen::Shop,
            Screen::Shop => Screen::Menu,
            other => other,
        };
        self.screen
    }

    pub fn toggle_quests(&mut self) -> Screen {
        self.screen = match self.screen {
            Screen::Menu | Screen::Shop => Screen::Quests,
            Screen::Quests => Screen::Menu,
            other => other,
        };
        self.screen
    }

    // === Lifecycle ===

    /// Start a fresh run with the current selection.
    ///
    /// Refused when the selected level or character is locked.
    pub fn start_run(&mut self) -> bool {
        let level = self.selected_level;
        let character = self.selected_character;
        if !self.profile.is_level_unlocked(level) || !self.profile.is_character_unlocked(character)
        {
            log::warn!(
                "Refusing to start: level {} / {} locked",
                level.number(),
                character.id()
            );
            return false;
        }

        self.profile.begin_run(&time::today(), &mut self.rng);

        let mut state = GameState::new(RunSetup {
            seed: self.rng.random(),
            level,
            character,
            prior_high_score: self.profile.high_score(level),
            tuning: self.tuning.clone(),
        });

        self.renderer.clear();
        self.renderer
            .set_background(self.tuning.level(level).background);
        self.renderer.set_camera(self.profile.settings().camera);
        self.renderer.spawn_player(
            character,
            state.player.size,
            self.profile.wardrobe().equipped_tint(),
        );
        // Initial obstacles
        dispatch_events(&mut state, &mut self.profile, &mut self.renderer);

        log::info!(
            "Run started: level {}, {} (seed {})",
            level.number(),
            character.id(),
            state.seed
        );
        self.state = Some(state);
        self.summary = None;
        self.input.clear();
        self.accumulator = 0.0;
        self.screen = Screen::Playing;
        true
    }

    /// Advance by `dt` seconds of wall time in fixed steps. `now_ms` is the
    /// animation-frame timestamp, passed through to the renderer.
    pub fn frame(&mut self, dt: f32, now_ms: f64) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        if !state.is_game_over() {
            self.accumulator += dt.min(0.1);
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.take_tick_input();
                let was_paused = state.is_paused();
                tick(state, &mut self.profile, &input, SIM_DT);
                if was_paused != state.is_paused() {
                    self.renderer.show_paused(state.is_paused());
                }
                if !state.is_game_over() && !state.is_paused() {
                    self.profile.record_score(state.score);
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
                if state.is_game_over() {
                    break;
                }
            }
            // Drop backlog a slow frame could not absorb
            if substeps == MAX_SUBSTEPS {
                self.accumulator = self.accumulator.min(SIM_DT);
            }
        }

        let over = dispatch_events(state, &mut self.profile, &mut self.renderer);
        self.renderer.update(state, now_ms);

        if let Some(reason) = over {
            let summary = RunSummary::new(state, reason, self.profile.high_score(state.level));
            for line in summary.unlock_messages() {
                log::info!("{}", line);
            }
            self.renderer.show_game_over(&summary);
            self.summary = Some(summary);
            self.screen = Screen::GameOver;
        }
    }

    /// Key press. Reset only works on the game-over screen.
    pub fn key_down(&mut self, action: InputAction) {
        match action {
            InputAction::Reset => {
                if self.screen == Screen::GameOver {
                    self.reset();
                }
            }
            InputAction::ToggleCamera => {
                self.profile.update_settings(|s| {
                    s.toggle_camera();
                });
                self.renderer.set_camera(self.profile.settings().camera);
            }
            InputAction::ToggleFps => self.toggle_fps(),
            _ => {
                if self.screen == Screen::Playing {
                    self.input.key_down(action);
                }
            }
        }
    }

    /// Flip the FPS counter and remember the choice
    pub fn toggle_fps(&mut self) {
        self.profile.update_settings(|s| {
            s.toggle_show_fps();
        });
        self.renderer.show_fps(self.profile.settings().show_fps);
    }

    pub fn key_up(&mut self, action: InputAction) {
        self.input.key_up(action);
    }

    /// Suspend the run. Ignored once the run is over.
    pub fn pause(&mut self) -> bool {
        let paused = self.state.as_mut().is_some_and(|s| s.pause());
        if paused {
            self.input.clear();
            self.renderer.show_paused(true);
            log::info!("Paused");
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.state.as_mut().is_some_and(|s| s.resume());
        if resumed {
            self.accumulator = 0.0;
            self.renderer.show_paused(false);
            log::info!("Resumed");
        }
        resumed
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state.as_ref() {
            Some(s) if s.is_paused() => self.resume(),
            Some(_) => self.pause(),
            None => false,
        }
    }

    /// Restart with the same selection, from game over or the pause menu
    pub fn reset(&mut self) -> bool {
        let allowed = self
            .state
            .as_ref()
            .is_some_and(|s| s.is_game_over() || s.is_paused());
        allowed && self.start_run()
    }

    /// Abandon any run and return to the level select
    pub fn back_to_menu(&mut self) {
        self.state = None;
        self.summary = None;
        self.input.clear();
        self.accumulator = 0.0;
        self.renderer.clear();
        self.screen = Screen::Menu;
    }

    /// Take the game-over screen's suggestion and start it
    pub fn accept_follow_up(&mut self) -> bool {
        let Some(follow_up) = self.summary.as_ref().and_then(|s| s.follow_up) else {
            return false;
        };
        match follow_up {
            FollowUp::PlayLevelWith(level, character) => {
                self.selected_level = level;
                self.selected_character = character;
            }
            FollowUp::PlayLevel(level) => self.selected_level = level,
            FollowUp::TryCharacter(character) => self.selected_character = character,
        }
        self.start_run()
    }
}

/// Route pending simulation events. Returns the game-over reason if the run
/// ended in this batch.
fn dispatch_events<S: KeyValueStore, R: Renderer>(
    state: &mut GameState,
    profile: &mut ProfileStore<S>,
    renderer: &mut R,
) -> Option<GameOverReason> {
    let mut over = None;
    for event in state.drain_events() {
        match event {
            GameEvent::ObstacleSpawned { id } => {
                if let Some(obstacle) = state.obstacles.iter().find(|o| o.id == id) {
                    renderer.spawn_obstacle(obstacle, &obstacle.colliders_at(state.elapsed));
                }
            }
            GameEvent::ObstacleEvicted { id } => renderer.despawn_obstacle(id),
            GameEvent::JumpPressed => {
                if profile.record_jump() > 0 {
                    log::info!("Jump quest complete");
                }
            }
            GameEvent::Jumped => {}
            GameEvent::Notice(notice) => renderer.show_notice(&notice),
            GameEvent::SingularityActivated { captured } => {
                log::debug!("Singularity holding {} obstacles", captured);
            }
            GameEvent::SingularityReleased => log::debug!("Singularity released"),
            GameEvent::GameOver { reason, score } => {
                renderer.tint_player(CRASH_TINT);
                profile.record_game_over(score);
                over = Some(reason);
            }
        }
    }
    over
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::GROUND_DEPTH;
    use crate::platform::{DayStamp, MemoryStore};
    use crate::quests::QuestKind;
    use crate::renderer::tests::RecordingRenderer;
    use crate::sim::{ObstacleKind, available_kinds};

    type TestSession = GameSession<MemoryStore, RecordingRenderer>;

    fn session_with(store: MemoryStore) -> TestSession {
        let mut rng = Pcg32::seed_from_u64(0);
        let profile = ProfileStore::load(store, &time::today(), &mut rng);
        GameSession::new(profile, RecordingRenderer::default(), Tuning::default(), 17)
    }

    fn fresh() -> TestSession {
        session_with(MemoryStore::new())
    }

    /// Jump the runner to `z` on a clear lane
    fn teleport(session: &mut TestSession, z: f32) {
        let Some(state) = session.state.as_mut() else {
            panic!("no run");
        };
        state.player.position.z = z;
        for (i, g) in state.grounds.iter_mut().enumerate() {
            g.center.z = z - i as f32 * GROUND_DEPTH;
        }
        state.obstacles.clear();
        state.spawner.last_spawn_z = z - 500.0;
    }

    fn clear_frame(session: &mut TestSession) {
        if let Some(state) = session.state.as_mut() {
            state.obstacles.clear();
        }
        session.frame(SIM_DT, 0.0);
    }

    fn settle(session: &mut TestSession) {
        for _ in 0..120 {
            clear_frame(session);
        }
    }

    #[test]
    fn test_fresh_profile_level_one_run() {
        let mut session = fresh();
        assert_eq!(session.screen(), Screen::Menu);
        assert!(!session.select_level(Level::Two));
        assert!(session.start_run());
        assert_eq!(session.screen(), Screen::Playing);

        let state = session.state().unwrap();
        let offered = &ObstacleKind::ALL[..2];
        assert_eq!(available_kinds(state.level, state.internal_level), offered);
        assert!(state.obstacles.iter().all(|o| offered.contains(&o.kind)));
        assert_eq!(session.renderer().obstacles.len(), state.obstacles.len());
        assert_eq!(
            session.renderer().player,
            Some((Character::Rocket, None))
        );
    }

    #[test]
    fn test_unlocks_and_game_over_summary() {
        let mut session = fresh();
        session.start_run();
        settle(&mut session);
        teleport(&mut session, -999.95);
        session.frame(SIM_DT, 0.0);

        let state = session.state().unwrap();
        assert_eq!(state.score, 1000);
        assert_eq!(state.newly_unlocked_level, Some(Level::Two));
        assert_eq!(state.newly_unlocked_character, Some(Character::Asteroid));
        assert!(session.profile().is_level_unlocked(Level::Two));
        assert!(
            session
                .renderer()
                .notices
                .contains(&Notice::LevelUnlocked(Level::Two))
        );

        session
            .state
            .as_mut()
            .unwrap()
            .trigger_game_over(GameOverReason::Crashed);
        session.frame(SIM_DT, 0.0);

        assert_eq!(session.screen(), Screen::GameOver);
        assert_eq!(session.renderer().tint, Some(CRASH_TINT));
        let summary = session.summary().unwrap();
        assert_eq!(summary.score, 1000);
        assert_eq!(summary.high_score, 1000);
        assert_eq!(
            summary.unlock_messages(),
            vec![
                "Level 2 Unlocked!".to_string(),
                "New Vehicle Unlocked: Rogue Asteroid".to_string()
            ]
        );
        assert_eq!(
            summary.follow_up,
            Some(FollowUp::PlayLevelWith(Level::Two, Character::Asteroid))
        );
        assert_eq!(session.renderer().game_over.as_ref(), Some(summary));

        assert!(session.accept_follow_up());
        let state = session.state().unwrap();
        assert_eq!(state.level, Level::Two);
        assert_eq!(state.character(), Character::Asteroid);
        assert!(session.summary().is_none());
    }

    #[test]
    fn test_pause_freezes_score() {
        let mut session = fresh();
        session.start_run();
        settle(&mut session);
        let before = session.state().unwrap().score;
        assert!(before > 0);

        assert!(session.pause());
        assert!(session.renderer().paused);
        for _ in 0..30 {
            session.frame(SIM_DT, 0.0);
        }
        let first = session.state().unwrap().score;
        let second = session.state().unwrap().score;
        assert_eq!(first, second);
        assert_eq!(first, before);

        assert!(session.resume());
        settle(&mut session);
        assert!(session.state().unwrap().score > before);
    }

    #[test]
    fn test_pause_key_goes_through_tick() {
        let mut session = fresh();
        session.start_run();
        settle(&mut session);
        session.key_down(InputAction::Pause);
        session.frame(SIM_DT, 0.0);
        assert!(session.state().unwrap().is_paused());
        assert!(session.renderer().paused);
        session.key_down(InputAction::Pause);
        session.frame(SIM_DT, 0.0);
        assert!(!session.state().unwrap().is_paused());
    }

    #[test]
    fn test_no_pause_after_game_over() {
        let mut session = fresh();
        session.start_run();
        session
            .state
            .as_mut()
            .unwrap()
            .trigger_game_over(GameOverReason::FellOff);
        session.frame(SIM_DT, 0.0);
        assert!(!session.pause());
        assert!(!session.toggle_pause());
        assert_eq!(session.summary().unwrap().follow_up, None);
    }

    #[test]
    fn test_reset_only_after_game_over() {
        let mut session = fresh();
        session.start_run();
        settle(&mut session);
        session.key_down(InputAction::Reset);
        assert!(session.state().unwrap().score > 0);

        session
            .state
            .as_mut()
            .unwrap()
            .trigger_game_over(GameOverReason::Crashed);
        session.frame(SIM_DT, 0.0);
        session.key_down(InputAction::Reset);
        assert_eq!(session.screen(), Screen::Playing);
        assert_eq!(session.state().unwrap().score, 0);
        assert_eq!(session.renderer().tint, None);
    }

    #[test]
    fn test_locked_character_cannot_start() {
        let mut session = fresh();
        assert_eq!(session.next_character(), Character::Asteroid);
        assert!(!session.is_selected_character_unlocked());
        assert!(!session.start_run());
        assert_eq!(session.screen(), Screen::Menu);
        assert_eq!(session.prev_character(), Character::Rocket);
        assert!(session.start_run());
    }

    #[test]
    fn test_jumps_feed_quests_and_game_over_counts_death() {
        let mut session = fresh();
        session.start_run();
        settle(&mut session);
        for _ in 0..3 {
            session.key_down(InputAction::Jump);
            clear_frame(&mut session);
        }
        let progress = |s: &TestSession, kind: QuestKind| {
            s.profile()
                .quests()
                .quests
                .iter()
                .find(|q| q.kind == kind)
                .map(|q| q.progress())
        };
        assert_eq!(progress(&session, QuestKind::JumpCount), Some(3));

        session
            .state
            .as_mut()
            .unwrap()
            .trigger_game_over(GameOverReason::Crashed);
        session.frame(SIM_DT, 0.0);
        assert_eq!(progress(&session, QuestKind::BoundedDeaths), Some(1));
        // Further frames do not count the death again
        session.frame(SIM_DT, 0.0);
        assert_eq!(progress(&session, QuestKind::BoundedDeaths), Some(1));

        // Next run starts with fresh run counters
        session.reset();
        assert_eq!(progress(&session, QuestKind::JumpCount), Some(0));
        assert_eq!(progress(&session, QuestKind::BoundedDeaths), Some(1));
    }

    #[test]
    fn test_equipped_skin_tints_player() {
        let mut store = MemoryStore::new();
        store.set("spaceRunnerCurrency", "150").unwrap();
        let mut session = session_with(store);
        session.profile_mut().purchase("crimson").unwrap();
        session.profile_mut().equip("crimson").unwrap();
        session.start_run();
        assert_eq!(
            session.renderer().player,
            Some((Character::Rocket, Some(0xd1201b)))
        );
    }

    #[test]
    fn test_menu_screens_and_back_to_menu() {
        let mut session = fresh();
        assert_eq!(session.toggle_shop(), Screen::Shop);
        assert_eq!(session.toggle_quests(), Screen::Quests);
        assert_eq!(session.toggle_quests(), Screen::Menu);
        session.start_run();
        assert_eq!(session.toggle_shop(), Screen::Playing);
        session.back_to_menu();
        assert!(session.state().is_none());
        assert_eq!(session.screen(), Screen::Menu);
        assert!(session.renderer().obstacles.is_empty());
    }

    #[test]
    fn test_slow_frames_do_not_fast_forward() {
        let mut session = fresh();
        assert!(session.start_run());
        for _ in 0..30 {
            if let Some(state) = session.state.as_mut() {
                state.obstacles.clear();
            }
            session.frame(0.1, 0.0);
        }
        assert!(session.accumulator <= SIM_DT);

        let before = session.state().unwrap().time_ticks;
        for _ in 0..60 {
            clear_frame(&mut session);
        }
        let ran = session.state().unwrap().time_ticks - before;
        assert!(ran <= 61, "ran {ran} ticks in one second of frames");
        assert!(!session.state().unwrap().is_game_over());
    }

    #[test]
    fn test_fps_toggle_persists() {
        let mut session = fresh();
        assert!(!session.renderer().fps_visible);
        session.key_down(InputAction::ToggleFps);
        assert!(session.renderer().fps_visible);
        assert!(session.profile().settings().show_fps);

        let store = session.profile().storage().clone();
        let mut rng = Pcg32::seed_from_u64(1);
        let profile = ProfileStore::load(store, &DayStamp::new(2026, 1, 1), &mut rng);
        let session = GameSession::new(profile, RecordingRenderer::default(), Tuning::default(), 3);
        assert!(session.renderer().fps_visible);
    }

    #[test]
    fn test_camera_toggle_persists() {
        let mut session = fresh();
        session.key_down(InputAction::ToggleCamera);
        assert_eq!(
            session.renderer().camera,
            Some(crate::settings::CameraMode::FirstPerson)
        );
        let store = session.profile().storage().clone();
        let mut rng = Pcg32::seed_from_u64(1);
        let profile = ProfileStore::load(store, &DayStamp::new(2026, 1, 1), &mut rng);
        assert_eq!(
            profile.settings().camera,
            crate::settings::CameraMode::FirstPerson
        );
    }
}
