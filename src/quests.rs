//! Daily quests
//!
//! Three slots, one of each [`QuestKind`], rerolled when the calendar day
//! changes. Progress is fed from run events by the session; claiming pays
//! currency exactly once per quest, plus a once-per-day bonus when every slot
//! has been claimed.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::DayStamp;

/// Currency paid per claimed quest
pub const QUEST_REWARD: u64 = 50;
/// Paid once per day when all quests are claimed
pub const ALL_COMPLETE_BONUS: u64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestError {
    #[error("no quest in slot {0}")]
    NoSuchQuest(usize),
    #[error("quest is not complete")]
    NotComplete,
    #[error("quest reward already claimed")]
    AlreadyClaimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestKind {
    /// Jump N times in a single run
    JumpCount,
    /// Reach a score of N in a single run
    SurviveScore,
    /// Die no more than N times today
    BoundedDeaths,
}

impl QuestKind {
    pub const ALL: [QuestKind; 3] = [
        QuestKind::JumpCount,
        QuestKind::SurviveScore,
        QuestKind::BoundedDeaths,
    ];

    pub fn target_range(&self) -> std::ops::RangeInclusive<u64> {
        match self {
            QuestKind::JumpCount => 20..=60,
            QuestKind::SurviveScore => 500..=3000,
            QuestKind::BoundedDeaths => 3..=10,
        }
    }

    pub fn describe(&self, target: u64) -> String {
        match self {
            QuestKind::JumpCount => format!("Jump {} times in one run", target),
            QuestKind::SurviveScore => format!("Reach a score of {}", target),
            QuestKind::BoundedDeaths => format!("Crash no more than {} times", target),
        }
    }
}

/// One daily objective
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub kind: QuestKind,
    pub target: u64,
    pub done: bool,
    pub claimed: bool,
    /// Jumps this run
    #[serde(default)]
    pub jumps: u64,
    /// Best score this run
    #[serde(default)]
    pub best_score: u64,
    /// Deaths since the quest was rolled
    #[serde(default)]
    pub deaths: u64,
}

impl Quest {
    pub fn roll(kind: QuestKind, rng: &mut impl Rng) -> Self {
        let target = rng.random_range(kind.target_range());
        Self {
            kind,
            target,
            // Zero deaths is within any bound
            done: kind == QuestKind::BoundedDeaths,
            claimed: false,
            jumps: 0,
            best_score: 0,
            deaths: 0,
        }
    }

    /// Counter shown against `target`
    pub fn progress(&self) -> u64 {
        match self.kind {
            QuestKind::JumpCount => self.jumps,
            QuestKind::SurviveScore => self.best_score,
            QuestKind::BoundedDeaths => self.deaths,
        }
    }

    pub fn is_claimable(&self) -> bool {
        self.done && !self.claimed
    }

    /// Returns true when this jump completed the quest
    fn on_jump(&mut self) -> bool {
        if self.kind != QuestKind::JumpCount || self.done {
            return false;
        }
        self.jumps += 1;
        self.done = self.jumps >= self.target;
        self.done
    }

    fn on_score(&mut self, score: u64) -> bool {
        if self.kind != QuestKind::SurviveScore || self.done {
            return false;
        }
        self.best_score = self.best_score.max(score);
        self.done = self.best_score >= self.target;
        self.done
    }

    /// Deaths keep counting while `done`; the bound is re-evaluated each time.
    /// A claimed quest is frozen.
    fn on_death(&mut self) -> bool {
        if self.kind != QuestKind::BoundedDeaths || self.claimed {
            return false;
        }
        self.deaths += 1;
        self.done = self.deaths <= self.target;
        true
    }

    fn reset_run(&mut self) {
        self.jumps = 0;
        self.best_score = 0;
    }
}

/// Result of a claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Quests newly marked claimed
    pub claimed: usize,
    /// Currency to credit
    pub currency: u64,
    /// Whether the all-complete bonus is included
    pub bonus: bool,
}

/// Today's quests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestBook {
    pub day: DayStamp,
    pub quests: Vec<Quest>,
}

impl QuestBook {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "spaceRunnerDailyQuests";

    /// Fresh set of quests for `day`: one of each kind, in random order
    pub fn roll(day: DayStamp, rng: &mut impl Rng) -> Self {
        let mut kinds = QuestKind::ALL;
        kinds.shuffle(rng);
        let quests = kinds.iter().map(|&k| Quest::roll(k, rng)).collect();
        log::info!("Rolled daily quests for {}", day);
        Self { day, quests }
    }

    /// Reroll if the stored day is not `today`. Returns true when rerolled.
    pub fn ensure_today(&mut self, today: &DayStamp, rng: &mut impl Rng) -> bool {
        if &self.day == today && self.quests.len() == QuestKind::ALL.len() {
            return false;
        }
        *self = Self::roll(today.clone(), rng);
        true
    }

    /// Returns the number of quests completed by this jump
    pub fn on_jump(&mut self) -> usize {
        self.quests.iter_mut().map(|q| q.on_jump()).filter(|&d| d).count()
    }

    pub fn on_score(&mut self, score: u64) -> usize {
        self.quests
            .iter_mut()
            .map(|q| q.on_score(score))
            .filter(|&d| d)
            .count()
    }

    /// Returns true when any counter moved
    pub fn on_death(&mut self) -> bool {
        self.quests
            .iter_mut()
            .fold(false, |changed, q| q.on_death() || changed)
    }

    /// Clear run-scoped counters; completion is kept
    pub fn reset_run(&mut self) {
        for quest in &mut self.quests {
            quest.reset_run();
        }
    }

    pub fn all_claimed(&self) -> bool {
        !self.quests.is_empty() && self.quests.iter().all(|q| q.claimed)
    }

    /// Claim one slot
    pub fn claim(&mut self, slot: usize, bonus_paid: bool) -> Result<ClaimOutcome, QuestError> {
        let quest = self
            .quests
            .get_mut(slot)
            .ok_or(QuestError::NoSuchQuest(slot))?;
        if quest.claimed {
            return Err(QuestError::AlreadyClaimed);
        }
        if !quest.done {
            return Err(QuestError::NotComplete);
        }
        quest.claimed = true;
        Ok(self.with_bonus(
            ClaimOutcome {
                claimed: 1,
                currency: QUEST_REWARD,
                bonus: false,
            },
            bonus_paid,
        ))
    }

    /// Claim every claimable slot. Calling again without new completions pays nothing.
    pub fn claim_all(&mut self, bonus_paid: bool) -> ClaimOutcome {
        let mut claimed = 0;
        for quest in self.quests.iter_mut().filter(|q| q.is_claimable()) {
            quest.claimed = true;
            claimed += 1;
        }
        self.with_bonus(
            ClaimOutcome {
                claimed,
                currency: claimed as u64 * QUEST_REWARD,
                bonus: false,
            },
            bonus_paid,
        )
    }

    fn with_bonus(&self, mut outcome: ClaimOutcome, bonus_paid: bool) -> ClaimOutcome {
        if outcome.claimed > 0 && !bonus_paid && self.all_claimed() {
            outcome.currency += ALL_COMPLETE_BONUS;
            outcome.bonus = true;
        }
        outcome
    }
}
