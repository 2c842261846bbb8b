//! Score, high score, unlocks and hardest-level stages
//!
//! Runs once per tick while the run is live. Unlock and high-score changes are
//! written straight through to the profile via [`Progress`].

use super::roster::{Character, Level};
use super::state::{GameState, Notice};

/// Persisted progression the state machine reads and writes through
pub trait Progress {
    fn high_score(&self, level: Level) -> u64;
    fn record_high_score(&mut self, level: Level, score: u64);
    fn is_level_unlocked(&self, level: Level) -> bool;
    fn unlock_level(&mut self, level: Level);
    fn is_character_unlocked(&self, character: Character) -> bool;
    fn unlock_character(&mut self, character: Character);
}

/// Score for a forward position: whole units traveled along -z
#[inline]
pub fn score_for(z: f32) -> u64 {
    (-z).floor().max(0.0) as u64
}

/// Apply one tick of progression. No-op once the run is over.
pub fn update(state: &mut GameState, progress: &mut impl Progress) {
    if state.is_game_over() {
        return;
    }

    state.score = state.score.max(score_for(state.player.position.z));

    update_high_score(state, progress);
    check_unlocks(state, progress);
    advance_stage(state);
}

fn update_high_score(state: &mut GameState, progress: &mut impl Progress) {
    if state.score <= progress.high_score(state.level) {
        return;
    }
    if !state.high_score_notified {
        state.high_score_notified = true;
        // A first-ever score is not a "new" record
        if state.prior_high_score > 0 {
            state.notify(Notice::NewHighScore);
        }
    }
    progress.record_high_score(state.level, state.score);
}

/// Level and character unlocks are independent; both can fire in one tick
fn check_unlocks(state: &mut GameState, progress: &mut impl Progress) {
    let (Some(threshold), Some(next)) = (state.level.unlock_score(), state.level.next()) else {
        return;
    };
    if state.score < threshold {
        return;
    }

    if !progress.is_level_unlocked(next) {
        progress.unlock_level(next);
        state.newly_unlocked_level = Some(next);
        log::info!("Level {} unlocked at score {}", next.number(), state.score);
        state.notify(Notice::LevelUnlocked(next));
    }

    // Checked on its own so a lost character write is repaired on the next crossing
    if let Some(character) = next.bound_character() {
        if !progress.is_character_unlocked(character) {
            progress.unlock_character(character);
            state.newly_unlocked_character = Some(character);
            log::info!("Character {} unlocked", character.id());
            state.notify(Notice::CharacterUnlocked(character));
        }
    }
}

fn advance_stage(state: &mut GameState) {
    if !state.level.has_stages() {
        return;
    }
    let next = state.internal_level + 1;
    let Some(stage) = state.tuning.stage(next).copied() else {
        return;
    };
    if state.score < stage.score {
        return;
    }
    state.internal_level = next;
    state.player_speed += stage.speed_delta;
    state.spawner.interval = stage.spawn_interval;
    log::info!("Stage {} reached at score {}", next - 2, state.score);
    state.notify(Notice::StageReached(next - 2));
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::sim::state::{GameEvent, GameOverReason, RunSetup};
    use crate::tuning::Tuning;

    /// In-memory progress for simulation tests
    #[derive(Debug, Default)]
    pub(crate) struct FakeProgress {
        pub scores: BTreeMap<Level, u64>,
        pub levels: BTreeSet<Level>,
        pub characters: BTreeSet<Character>,
        pub writes: u32,
    }

    impl FakeProgress {
        pub fn fresh() -> Self {
            Self {
                levels: [Level::One].into(),
                characters: [Character::Rocket].into(),
                ..Default::default()
            }
        }
    }

    impl Progress for FakeProgress {
        fn high_score(&self, level: Level) -> u64 {
            self.scores.get(&level).copied().unwrap_or(0)
        }
        fn record_high_score(&mut self, level: Level, score: u64) {
            self.scores.insert(level, score);
            self.writes += 1;
        }
        fn is_level_unlocked(&self, level: Level) -> bool {
            self.levels.contains(&level)
        }
        fn unlock_level(&mut self, level: Level) {
            self.levels.insert(level);
            self.writes += 1;
        }
        fn is_character_unlocked(&self, character: Character) -> bool {
            self.characters.contains(&character)
        }
        fn unlock_character(&mut self, character: Character) {
            self.characters.insert(character);
            self.writes += 1;
        }
    }

    fn run(level: Level, prior_high_score: u64) -> GameState {
        GameState::new(RunSetup {
            seed: 11,
            level,
            character: Character::Rocket,
            prior_high_score,
            tuning: Tuning::default(),
        })
    }

    fn notices(state: &mut GameState) -> Vec<Notice> {
        state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_score_floor_of_distance() {
        assert_eq!(score_for(0.0), 0);
        assert_eq!(score_for(-0.99), 0);
        assert_eq!(score_for(-1000.2), 1000);
        assert_eq!(score_for(3.0), 0);
    }

    #[test]
    fn test_level_two_unlock_fires_once() {
        let mut progress = FakeProgress::fresh();
        let mut state = run(Level::One, 0);

        state.player.position.z = -999.5;
        update(&mut state, &mut progress);
        assert_eq!(state.newly_unlocked_level, None);

        state.player.position.z = -1000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.newly_unlocked_level, Some(Level::Two));
        assert_eq!(state.newly_unlocked_character, Some(Character::Asteroid));
        assert!(progress.is_level_unlocked(Level::Two));
        assert!(progress.is_character_unlocked(Character::Asteroid));
        let fired = notices(&mut state);
        assert!(fired.contains(&Notice::LevelUnlocked(Level::Two)));
        assert!(fired.contains(&Notice::CharacterUnlocked(Character::Asteroid)));

        state.player.position.z = -1200.0;
        update(&mut state, &mut progress);
        let again = notices(&mut state);
        assert!(!again.iter().any(|n| matches!(n, Notice::LevelUnlocked(_))));
    }

    #[test]
    fn test_character_already_owned_is_not_reannounced() {
        let mut progress = FakeProgress::fresh();
        progress.characters.insert(Character::Asteroid);
        let mut state = run(Level::One, 0);
        state.player.position.z = -1001.0;
        update(&mut state, &mut progress);
        assert_eq!(state.newly_unlocked_level, Some(Level::Two));
        assert_eq!(state.newly_unlocked_character, None);
    }

    #[test]
    fn test_locked_character_unlocks_when_level_already_open() {
        let mut progress = FakeProgress::fresh();
        progress.levels.insert(Level::Two);
        let mut state = run(Level::One, 0);
        state.player.position.z = -1001.0;
        update(&mut state, &mut progress);
        assert_eq!(state.newly_unlocked_level, None);
        assert_eq!(state.newly_unlocked_character, Some(Character::Asteroid));
        assert!(progress.is_character_unlocked(Character::Asteroid));
        assert_eq!(
            notices(&mut state),
            vec![Notice::CharacterUnlocked(Character::Asteroid)]
        );
    }

    #[test]
    fn test_high_score_notice_needs_prior_record() {
        let mut progress = FakeProgress::fresh();
        let mut state = run(Level::One, 0);
        state.player.position.z = -50.0;
        update(&mut state, &mut progress);
        assert_eq!(progress.high_score(Level::One), 50);
        assert!(state.high_score_notified);
        assert!(!notices(&mut state).contains(&Notice::NewHighScore));

        progress.scores.insert(Level::One, 100);
        let mut state = run(Level::One, 100);
        state.player.position.z = -101.0;
        update(&mut state, &mut progress);
        assert_eq!(notices(&mut state), vec![Notice::NewHighScore]);
        state.player.position.z = -150.0;
        update(&mut state, &mut progress);
        assert!(notices(&mut state).is_empty());
        assert_eq!(progress.high_score(Level::One), 150);
    }

    #[test]
    fn test_stages_only_on_hardest_level() {
        let mut progress = FakeProgress::fresh();
        let mut state = run(Level::Two, 0);
        state.player.position.z = -5000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.internal_level, 2);

        let mut state = run(Level::Three, 0);
        let base_speed = state.player_speed;
        state.player.position.z = -4000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.internal_level, 4);
        assert_eq!(state.spawner.interval, 16.0);
        assert!((state.player_speed - (base_speed - 0.01)).abs() < 1e-6);
        assert!(notices(&mut state).contains(&Notice::StageReached(2)));

        state.player.position.z = -7000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.internal_level, 5);
        assert_eq!(state.spawner.interval, 14.0);

        state.player.position.z = -20000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.internal_level, 5);
    }

    #[test]
    fn test_frozen_after_game_over() {
        let mut progress = FakeProgress::fresh();
        let mut state = run(Level::One, 0);
        state.player.position.z = -10.0;
        update(&mut state, &mut progress);
        state.trigger_game_over(GameOverReason::Crashed);
        state.player.position.z = -2000.0;
        update(&mut state, &mut progress);
        assert_eq!(state.score, 10);
        assert!(!progress.is_level_unlocked(Level::Two));
    }
}
