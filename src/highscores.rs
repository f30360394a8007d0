//! Per-difficulty high scores and the win streak
//!
//! Each tier keeps its own high-water mark under its own key, stored as
//! decimal text. The streak counts consecutive victories.

use crate::settings::Difficulty;
use crate::storage::{self, KeyValueStore, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScores {
    pub easy: u64,
    pub normal: u64,
    pub hard: u64,
    pub win_streak: u32,
}

impl HighScores {
    /// Load all tiers and the streak. Missing or malformed entries read as 0.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let normal = storage::load_u64(store, Difficulty::Normal.high_score_key())
            .or_else(|| storage::load_u64(store, keys::HIGH_SCORE_LEGACY))
            .unwrap_or(0);
        let scores = Self {
            easy: storage::load_u64(store, Difficulty::Easy.high_score_key()).unwrap_or(0),
            normal,
            hard: storage::load_u64(store, Difficulty::Hard.high_score_key()).unwrap_or(0),
            win_streak: storage::load_u64(store, keys::WIN_STREAK)
                .map(|n| n.min(u32::MAX as u64) as u32)
                .unwrap_or(0),
        };
        log::info!(
            "High scores loaded (easy {}, normal {}, hard {}, streak {})",
            scores.easy,
            scores.normal,
            scores.hard,
            scores.win_streak
        );
        scores
    }

    pub fn get(&self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }

    fn slot_mut(&mut self, difficulty: Difficulty) -> &mut u64 {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Normal => &mut self.normal,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Record a score for a tier. Returns true (and persists) if it beat the old mark.
    pub fn submit(&mut self, difficulty: Difficulty, score: u64, store: &dyn KeyValueStore) -> bool {
        let slot = self.slot_mut(difficulty);
        if score <= *slot {
            return false;
        }
        *slot = score;
        storage::save_u64(store, difficulty.high_score_key(), score);
        log::info!("New {} high score: {}", difficulty.as_str(), score);
        true
    }

    pub fn increment_streak(&mut self, store: &dyn KeyValueStore) -> u32 {
        self.win_streak = self.win_streak.saturating_add(1);
        storage::save_u64(store, keys::WIN_STREAK, self.win_streak as u64);
        self.win_streak
    }

    pub fn reset_streak(&mut self, store: &dyn KeyValueStore) {
        self.win_streak = 0;
        storage::save_u64(store, keys::WIN_STREAK, 0);
    }
}
