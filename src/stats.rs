//! Cross-session play statistics
//!
//! Updated once per finished run and persisted as JSON.

use serde::{Deserialize, Serialize};

use crate::storage::{self, KeyValueStore, keys};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Eliminated,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub total_games: u32,
    pub total_wins: u32,
    pub total_eliminations: u32,
    /// Fewest seconds taken to win
    pub best_time: Option<u32>,
    /// Running mean of distance reached per game
    pub average_distance: f64,
    /// Unix timestamp (ms) of the last finished game
    pub last_played: Option<f64>,
}

impl Stats {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let stats: Stats = storage::load_json(store, keys::STATS);
        log::info!("Stats loaded ({} games played)", stats.total_games);
        stats
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        storage::save_json(store, keys::STATS, self);
    }

    /// Fold one finished game into the totals and persist
    pub fn record_game(
        &mut self,
        result: GameResult,
        distance: f64,
        time_spent: u32,
        timestamp: f64,
        store: &dyn KeyValueStore,
    ) {
        self.total_games += 1;
        self.last_played = Some(timestamp);

        match result {
            GameResult::Win => {
                self.total_wins += 1;
                if self.best_time.is_none_or(|best| time_spent < best) {
                    self.best_time = Some(time_spent);
                }
            }
            GameResult::Eliminated => self.total_eliminations += 1,
        }

        let games = self.total_games as f64;
        self.average_distance = (self.average_distance * (games - 1.0) + distance) / games;

        self.save(store);
    }

    /// Percentage of games won (0 when nothing has been played)
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        self.total_wins as f64 / self.total_games as f64 * 100.0
    }

    /// Clear all statistics and drop the stored record
    pub fn reset(&mut self, store: &dyn KeyValueStore) {
        *self = Self::default();
        store.remove(keys::STATS);
        log::info!("Stats reset");
    }
}
