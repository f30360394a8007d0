//! The game store: sole writer of `GameState`
//!
//! Every mutation goes through one of the operations below. None of them
//! fail; out-of-range values are clamped and requests that don't apply to
//! the current status are ignored. Notable changes are queued as
//! `GameEvent`s for the session to drain.

use std::rc::Rc;

use super::state::{DetectionStatus, GameConfig, GameState, GameStatus};
use crate::highscores::HighScores;
use crate::settings::Difficulty;
use crate::storage::KeyValueStore;

/// Notifications produced by store mutations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    StatusChanged { from: GameStatus, to: GameStatus },
    PhaseChanged(DetectionStatus),
    /// A life was lost; `lives` is what remains
    LifeLost { lives: u32 },
    Victory { score: u64, new_high_score: bool },
}

pub struct GameStore {
    state: GameState,
    config: GameConfig,
    scores: HighScores,
    storage: Rc<dyn KeyValueStore>,
    events: Vec<GameEvent>,
    /// Bumped on every start/reset so stale timers can tell runs apart
    generation: u64,
}

impl GameStore {
    pub fn new(config: GameConfig, storage: Rc<dyn KeyValueStore>) -> Self {
        let scores = HighScores::load(storage.as_ref());
        let mut state = GameState::new(&config);
        state.high_score = scores.get(state.difficulty);
        state.win_streak = scores.win_streak;
        Self {
            state,
            config,
            scores,
            storage,
            events: Vec::new(),
            generation: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn set_status(&mut self, status: GameStatus) {
        if self.state.status != status {
            self.enter_status(status);
        }
    }

    /// Switch status and always notify, even when re-entering the same one
    fn enter_status(&mut self, status: GameStatus) {
        let from = self.state.status;
        self.state.status = status;
        log::debug!("Status {:?} -> {:?}", from, status);
        self.events.push(GameEvent::StatusChanged { from, to: status });
    }

    fn reset_run_fields(&mut self) {
        self.state.score = 0;
        self.state.distance = 0.0;
        self.state.lives = self.config.initial_lives;
        self.state.round = 1;
        self.state.is_eliminated = false;
        self.state.time_remaining = self.config.initial_time;
        self.state.countdown = self.config.countdown_from;
        self.state.detection_status = DetectionStatus::Green;
    }

    /// Begin a new run, through the countdown when one is configured
    pub fn start_game(&mut self) {
        self.generation += 1;
        self.reset_run_fields();
        if self.config.use_countdown && self.config.countdown_from > 0 {
            self.enter_status(GameStatus::Countdown);
        } else {
            self.enter_status(GameStatus::Playing);
        }
        log::info!(
            "Game started ({}, run {})",
            self.state.difficulty.as_str(),
            self.generation
        );
    }

    /// Set the countdown value; reaching 0 during the countdown starts play
    pub fn set_countdown(&mut self, n: u32) {
        self.state.countdown = n;
        if n == 0 && self.state.status == GameStatus::Countdown {
            self.set_status(GameStatus::Playing);
        }
    }

    /// Advance toward the finish line. Returns true if the distance changed.
    pub fn move_forward(&mut self, amount: f64) -> bool {
        if self.state.status != GameStatus::Playing || self.state.is_eliminated {
            return false;
        }
        if !amount.is_finite() {
            return false;
        }
        let total = self.state.total_distance;
        let before = self.state.distance;
        self.state.distance = (before + amount).clamp(0.0, total);
        if self.state.distance >= total {
            self.win();
        }
        self.state.distance != before
    }

    /// Lose a life; losing the last one ends the run
    pub fn eliminate(&mut self) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        self.state.lives = self.state.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            lives: self.state.lives,
        });

        if self.state.lives == 0 {
            self.state.is_eliminated = true;
            self.scores.reset_streak(self.storage.as_ref());
            self.state.win_streak = 0;
            self.set_status(GameStatus::GameOver);
            log::info!("Eliminated at {:.1}/{}", self.state.distance, self.state.total_distance);
        } else {
            log::info!("Life lost, {} remaining", self.state.lives);
        }
    }

    /// Finish the run as a victory and settle score, high score and streak
    pub fn win(&mut self) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        let score = (self.state.distance + self.state.time_remaining as f64 * 10.0).floor();
        self.state.score = score.max(0.0) as u64;

        let difficulty = self.state.difficulty;
        let new_high_score = self
            .scores
            .submit(difficulty, self.state.score, self.storage.as_ref());
        self.state.high_score = self.scores.get(difficulty);
        self.state.win_streak = self.scores.increment_streak(self.storage.as_ref());

        self.set_status(GameStatus::Victory);
        self.events.push(GameEvent::Victory {
            score: self.state.score,
            new_high_score,
        });
        log::info!(
            "Victory! Score {} (streak {})",
            self.state.score,
            self.state.win_streak
        );
    }

    pub fn set_detection_status(&mut self, phase: DetectionStatus) {
        if self.state.detection_status == phase {
            return;
        }
        self.state.detection_status = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    /// Set the clock, clamped at 0. A clock at 0 during play costs a life.
    pub fn set_time_remaining(&mut self, seconds: i64) {
        self.state.time_remaining = seconds.clamp(0, u32::MAX as i64) as u32;
        if self.state.time_remaining == 0 && self.state.status == GameStatus::Playing {
            self.eliminate();
        }
    }

    /// Count another survived green/red cycle
    pub fn next_round(&mut self) {
        if self.state.status == GameStatus::Playing {
            self.state.round += 1;
        }
    }

    /// Back to Idle. Persisted high scores, stats and streak are untouched.
    pub fn reset_game(&mut self) {
        self.generation += 1;
        self.reset_run_fields();
        self.set_status(GameStatus::Idle);
    }

    /// Switch difficulty tier and show that tier's high score
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.state.difficulty = difficulty;
        self.state.high_score = self.scores.get(difficulty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, keys};

    fn playing_store(config: GameConfig) -> (GameStore, Rc<MemoryStore>) {
        let storage = Rc::new(MemoryStore::new());
        let mut store = GameStore::new(
            GameConfig {
                use_countdown: false,
                ..config
            },
            storage.clone(),
        );
        store.start_game();
        assert_eq!(store.status(), GameStatus::Playing);
        (store, storage)
    }

    #[test]
    fn test_start_goes_through_countdown() {
        let mut store = GameStore::new(GameConfig::default(), Rc::new(MemoryStore::new()));
        store.start_game();
        assert_eq!(store.status(), GameStatus::Countdown);
        assert_eq!(store.state().countdown, 3);

        store.set_countdown(2);
        store.set_countdown(1);
        assert_eq!(store.status(), GameStatus::Countdown);
        store.set_countdown(0);
        assert_eq!(store.status(), GameStatus::Playing);
    }

    #[test]
    fn test_countdown_outside_countdown_status_does_not_start() {
        let mut store = GameStore::new(GameConfig::default(), Rc::new(MemoryStore::new()));
        store.set_countdown(0);
        assert_eq!(store.status(), GameStatus::Idle);
    }

    #[test]
    fn test_move_forward_ignored_unless_playing() {
        let mut store = GameStore::new(GameConfig::default(), Rc::new(MemoryStore::new()));
        assert!(!store.move_forward(5.0));
        store.start_game();
        assert!(!store.move_forward(5.0));
        assert_eq!(store.state().distance, 0.0);
    }

    #[test]
    fn test_move_forward_clamps_and_wins_once() {
        let (mut store, _) = playing_store(GameConfig::default());
        store.move_forward(95.0);
        assert_eq!(store.status(), GameStatus::Playing);
        store.move_forward(50.0);
        assert_eq!(store.state().distance, 100.0);
        assert_eq!(store.status(), GameStatus::Victory);

        assert!(!store.move_forward(5.0));
        let victories = store
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Victory { .. }))
            .count();
        assert_eq!(victories, 1);
    }

    #[test]
    fn test_twenty_steps_win_with_time_bonus() {
        let (mut store, storage) = playing_store(GameConfig::default());
        store.set_time_remaining(42);
        for _ in 0..20 {
            store.move_forward(5.0);
        }
        assert_eq!(store.status(), GameStatus::Victory);
        assert_eq!(store.state().score, 100 + 42 * 10);
        assert_eq!(store.state().high_score, 520);
        assert_eq!(store.state().win_streak, 1);
        assert_eq!(storage.get(keys::HIGH_SCORE_MEDIUM).as_deref(), Some("520"));
        assert_eq!(storage.get(keys::WIN_STREAK).as_deref(), Some("1"));
    }

    #[test]
    fn test_eliminate_with_lives_left_only_decrements() {
        let (mut store, _) = playing_store(GameConfig::default());
        store.eliminate();
        assert_eq!(store.state().lives, 2);
        assert_eq!(store.status(), GameStatus::Playing);
        assert!(!store.state().is_eliminated);
    }

    #[test]
    fn test_eliminate_last_life_ends_game_and_resets_streak() {
        let storage = Rc::new(MemoryStore::new());
        storage.set(keys::WIN_STREAK, "4");
        let mut store = GameStore::new(
            GameConfig {
                initial_lives: 1,
                use_countdown: false,
                ..Default::default()
            },
            storage.clone(),
        );
        assert_eq!(store.state().win_streak, 4);
        store.start_game();
        store.eliminate();
        assert_eq!(store.status(), GameStatus::GameOver);
        assert!(store.state().is_eliminated);
        assert_eq!(store.state().win_streak, 0);
        assert_eq!(storage.get(keys::WIN_STREAK).as_deref(), Some("0"));
    }

    #[test]
    fn test_clock_reaching_zero_eliminates() {
        let (mut store, _) = playing_store(GameConfig {
            initial_lives: 1,
            ..Default::default()
        });
        store.set_time_remaining(1);
        assert_eq!(store.status(), GameStatus::Playing);
        store.set_time_remaining(-5);
        assert_eq!(store.state().time_remaining, 0);
        assert_eq!(store.status(), GameStatus::GameOver);
    }

    #[test]
    fn test_reset_keeps_persisted_aggregates() {
        let (mut store, storage) = playing_store(GameConfig::default());
        for _ in 0..20 {
            store.move_forward(5.0);
        }
        let high = store.state().high_score;
        store.reset_game();

        let state = store.state();
        assert_eq!(state.status, GameStatus::Idle);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.lives, 3);
        assert!(!state.is_eliminated);
        assert_eq!(state.high_score, high);
        assert_eq!(state.win_streak, 1);
        assert_eq!(storage.get(keys::WIN_STREAK).as_deref(), Some("1"));
    }

    #[test]
    fn test_set_difficulty_selects_slot() {
        let storage = Rc::new(MemoryStore::new());
        storage.set(keys::HIGH_SCORE_HARD, "900");
        let mut store = GameStore::new(GameConfig::default(), storage);
        assert_eq!(store.state().high_score, 0);
        store.set_difficulty(Difficulty::Hard);
        assert_eq!(store.state().high_score, 900);
    }

    #[test]
    fn test_generation_changes_on_start_and_reset() {
        let mut store = GameStore::new(GameConfig::default(), Rc::new(MemoryStore::new()));
        let g0 = store.generation();
        store.start_game();
        store.reset_game();
        assert_eq!(store.generation(), g0 + 2);
    }

    #[test]
    fn test_restart_while_playing_announces_new_run() {
        let (mut store, _) = playing_store(GameConfig::default());
        store.drain_events();
        store.start_game();
        assert_eq!(
            store.drain_events(),
            vec![GameEvent::StatusChanged {
                from: GameStatus::Playing,
                to: GameStatus::Playing,
            }]
        );
    }

    #[test]
    fn test_phase_change_emits_event_once() {
        let (mut store, _) = playing_store(GameConfig::default());
        store.drain_events();
        store.set_detection_status(DetectionStatus::Red);
        store.set_detection_status(DetectionStatus::Red);
        assert_eq!(
            store.drain_events(),
            vec![GameEvent::PhaseChanged(DetectionStatus::Red)]
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn distance_stays_in_bounds(steps in proptest::collection::vec(0.0f64..60.0, 0..40)) {
                let (mut store, _) = playing_store(GameConfig::default());
                for amount in steps {
                    store.move_forward(amount);
                    let d = store.state().distance;
                    prop_assert!((0.0..=100.0).contains(&d));
                }
            }
        }
    }
}
