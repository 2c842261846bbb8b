//! Persisted player profile
//!
//! Features:
//! - Loaded once at startup, merged over defaults
//! - Every mutation written through immediately under its own key
//! - Corrupt or missing values fall back to defaults with a warning
//! - Write failures are logged, never fatal; in-memory state stays authoritative

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::Serialize;

use crate::highscores::HighScores;
use crate::platform::storage::{self, KeyValueStore};
use crate::platform::DayStamp;
use crate::quests::{ClaimOutcome, QuestBook, QuestError};
use crate::settings::Settings;
use crate::shop::{ShopError, SkinItem, Wardrobe};
use crate::sim::{Character, Level, Progress};

/// Unlocked character ids (array)
pub const UNLOCKS_KEY: &str = "spaceRunnerUnlocks";
/// Level number to unlocked flag (map)
pub const LEVELS_KEY: &str = "spaceRunnerUnlockedLevels";
/// Day on which the all-quests bonus was paid
pub const REWARDED_KEY: &str = "spaceRunnerQuestsRewarded";

/// Write one key, logging instead of failing
fn persist<T: Serialize + ?Sized>(store: &mut impl KeyValueStore, key: &str, value: &T) {
    if let Err(e) = storage::save_json(store, key, value) {
        log::warn!("Failed to save {}: {}", key, e);
    }
}

/// Everything about the player that outlives a run
pub struct ProfileStore<S: KeyValueStore> {
    store: S,
    characters: BTreeSet<Character>,
    levels: BTreeMap<u8, bool>,
    high_scores: HighScores,
    quests: QuestBook,
    rewarded_day: Option<DayStamp>,
    wardrobe: Wardrobe,
    settings: Settings,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// Read every key once. Quests are rerolled if they are not from `today`.
    pub fn load(store: S, today: &DayStamp, rng: &mut impl Rng) -> Self {
        let mut characters: BTreeSet<Character> = [Character::Rocket].into();
        let stored_ids: Vec<String> = storage::load_json_or_default(&store, UNLOCKS_KEY);
        for id in stored_ids {
            match Character::from_id(&id) {
                Some(c) => {
                    characters.insert(c);
                }
                None => log::warn!("Ignoring unknown character {:?}", id),
            }
        }

        let mut levels: BTreeMap<u8, bool> = Level::ALL
            .iter()
            .map(|l| (l.number(), *l == Level::One))
            .collect();
        let stored_levels: BTreeMap<u8, bool> = storage::load_json_or_default(&store, LEVELS_KEY);
        for (number, unlocked) in stored_levels {
            if Level::from_number(number).is_some() {
                levels.insert(number, unlocked || number == Level::One.number());
            }
        }

        let high_scores = HighScores::load(&store);
        let rewarded_day: Option<DayStamp> = storage::load_json_or_default(&store, REWARDED_KEY);
        let wardrobe = Wardrobe {
            currency: storage::load_json_or_default(&store, Wardrobe::CURRENCY_KEY),
            purchases: storage::load_json_or_default(&store, Wardrobe::PURCHASES_KEY),
            equipped: storage::load_json_or_default(&store, Wardrobe::EQUIPPED_KEY),
        };
        let settings = Settings::load(&store);

        let stored_quests: Option<QuestBook> =
            storage::load_json_or_default(&store, QuestBook::STORAGE_KEY);
        let (quests, rolled) = match stored_quests {
            Some(mut book) => {
                let rolled = book.ensure_today(today, rng);
                (book, rolled)
            }
            None => (QuestBook::roll(today.clone(), rng), true),
        };

        let mut profile = Self {
            store,
            characters,
            levels,
            high_scores,
            quests,
            rewarded_day,
            wardrobe,
            settings,
        };
        if rolled {
            profile.save_quests();
        }
        log::info!(
            "Profile loaded: {} characters, {} levels, {} currency",
            profile.characters.len(),
            profile.levels.values().filter(|&&u| u).count(),
            profile.wardrobe.currency
        );
        profile
    }

    pub fn storage(&self) -> &S {
        &self.store
    }

    pub fn unlocked_characters(&self) -> impl Iterator<Item = Character> + '_ {
        self.characters.iter().copied()
    }

    pub fn unlocked_levels(&self) -> impl Iterator<Item = Level> + '_ {
        Level::ALL
            .into_iter()
            .filter(|l| self.levels.get(&l.number()).copied().unwrap_or(false))
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    fn save_characters(&mut self) {
        let ids: Vec<&str> = self.characters.iter().map(|c| c.id()).collect();
        persist(&mut self.store, UNLOCKS_KEY, &ids);
    }

    // === Quests ===

    pub fn quests(&self) -> &QuestBook {
        &self.quests
    }

    fn save_quests(&mut self) {
        persist(&mut self.store, QuestBook::STORAGE_KEY, &self.quests);
    }

    /// Reroll for a new day and clear run counters
    pub fn begin_run(&mut self, today: &DayStamp, rng: &mut impl Rng) {
        self.quests.ensure_today(today, rng);
        self.quests.reset_run();
        self.save_quests();
    }

    /// Returns the number of quests this jump completed
    pub fn record_jump(&mut self) -> usize {
        let completed = self.quests.on_jump();
        if completed > 0 {
            self.save_quests();
        }
        completed
    }

    pub fn record_score(&mut self, score: u64) -> usize {
        let completed = self.quests.on_score(score);
        if completed > 0 {
            self.save_quests();
        }
        completed
    }

    /// Final score and death for a finished run, written once
    pub fn record_game_over(&mut self, score: u64) {
        self.quests.on_score(score);
        self.quests.on_death();
        self.save_quests();
    }

    fn bonus_paid(&self) -> bool {
        self.rewarded_day.as_ref() == Some(&self.quests.day)
    }

    fn apply_claim(&mut self, outcome: ClaimOutcome) -> ClaimOutcome {
        if outcome.claimed == 0 {
            return outcome;
        }
        if outcome.bonus {
            self.rewarded_day = Some(self.quests.day.clone());
            persist(&mut self.store, REWARDED_KEY, &self.rewarded_day);
        }
        self.wardrobe.credit(outcome.currency);
        persist(
            &mut self.store,
            Wardrobe::CURRENCY_KEY,
            &self.wardrobe.currency,
        );
        self.save_quests();
        log::info!(
            "Claimed {} quests for {} currency",
            outcome.claimed,
            outcome.currency
        );
        outcome
    }

    pub fn claim_quest(&mut self, slot: usize) -> Result<ClaimOutcome, QuestError> {
        let outcome = self.quests.claim(slot, self.bonus_paid())?;
        Ok(self.apply_claim(outcome))
    }

    pub fn claim_all_quests(&mut self) -> ClaimOutcome {
        let outcome = self.quests.claim_all(self.bonus_paid());
        self.apply_claim(outcome)
    }

    // === Shop ===

    pub fn wardrobe(&self) -> &Wardrobe {
        &self.wardrobe
    }

    pub fn currency(&self) -> u64 {
        self.wardrobe.currency
    }

    pub fn purchase(&mut self, id: &str) -> Result<&'static SkinItem, ShopError> {
        let item = self.wardrobe.purchase(id)?;
        persist(
            &mut self.store,
            Wardrobe::CURRENCY_KEY,
            &self.wardrobe.currency,
        );
        persist(
            &mut self.store,
            Wardrobe::PURCHASES_KEY,
            &self.wardrobe.purchases,
        );
        Ok(item)
    }

    pub fn equip(&mut self, id: &str) -> Result<&'static SkinItem, ShopError> {
        let item = self.wardrobe.equip(id)?;
        persist(
            &mut self.store,
            Wardrobe::EQUIPPED_KEY,
            &self.wardrobe.equipped,
        );
        Ok(item)
    }

    pub fn unequip(&mut self) {
        self.wardrobe.unequip();
        persist(
            &mut self.store,
            Wardrobe::EQUIPPED_KEY,
            &self.wardrobe.equipped,
        );
    }

    // === Settings ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Change settings and write them back
    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }
}

impl<S: KeyValueStore> Progress for ProfileStore<S> {
    fn high_score(&self, level: Level) -> u64 {
        self.high_scores.get(level)
    }

    fn record_high_score(&mut self, level: Level, score: u64) {
        if self.high_scores.record(level, score) {
            if let Err(e) = self.high_scores.save(&mut self.store) {
                log::warn!("Failed to save high scores: {}", e);
            }
        }
    }

    fn is_level_unlocked(&self, level: Level) -> bool {
        self.levels.get(&level.number()).copied().unwrap_or(false)
    }

    fn unlock_level(&mut self, level: Level) {
        self.levels.insert(level.number(), true);
        persist(&mut self.store, LEVELS_KEY, &self.levels);
    }

    fn is_character_unlocked(&self, character: Character) -> bool {
        self.characters.contains(&character)
    }

    fn unlock_character(&mut self, character: Character) {
        if self.characters.insert(character) {
            self.save_characters();
        }
    }
}
