//! Game state and derived views
//!
//! `GameState` is the snapshot the presentation layer reads. Only
//! `GameStore` writes to it.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Difficulty;

/// Overall status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Waiting for the player to start
    #[default]
    Idle,
    /// Pre-game countdown running
    Countdown,
    /// Active gameplay
    Playing,
    /// Out of lives
    GameOver,
    /// Crossed the finish line
    Victory,
}

impl GameStatus {
    /// True for the two terminal outcomes of a run
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

/// Phase of the detection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    /// Movement allowed
    #[default]
    Green,
    /// Warning before red, movement still allowed
    Yellow,
    /// Movement forbidden
    Red,
}

/// Runtime configuration for a game store
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    /// Seconds on the clock at the start of a run
    pub initial_time: u32,
    /// Distance to the finish line
    pub total_distance: f64,
    pub initial_lives: u32,
    /// Countdown start value
    pub countdown_from: u32,
    /// When false `start_game` goes straight to Playing
    pub use_countdown: bool,
    /// Distance covered by one accepted movement
    pub move_step: f64,
    /// Minimum gap between two accepted movements (ms)
    pub move_cooldown_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_time: INITIAL_TIME,
            total_distance: FINISH_LINE,
            initial_lives: INITIAL_LIVES,
            countdown_from: COUNTDOWN_FROM,
            use_countdown: true,
            move_step: MOVE_STEP,
            move_cooldown_ms: MOVE_COOLDOWN_MS,
        }
    }
}

/// Complete per-session game state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    pub score: u64,
    /// High score for the active difficulty
    pub high_score: u64,
    /// Seconds left on the clock
    pub time_remaining: u32,
    pub distance: f64,
    pub total_distance: f64,
    pub is_eliminated: bool,
    pub lives: u32,
    pub detection_status: DetectionStatus,
    pub round: u32,
    pub countdown: u32,
    pub difficulty: Difficulty,
    pub win_streak: u32,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            status: GameStatus::Idle,
            score: 0,
            high_score: 0,
            time_remaining: config.initial_time,
            distance: 0.0,
            total_distance: config.total_distance,
            is_eliminated: false,
            lives: config.initial_lives,
            detection_status: DetectionStatus::Green,
            round: 1,
            countdown: config.countdown_from,
            difficulty: Difficulty::Normal,
            win_streak: 0,
        }
    }

    /// Progress toward the finish line, 0-100
    pub fn progress_percent(&self) -> f64 {
        if self.total_distance <= 0.0 {
            return 0.0;
        }
        self.distance / self.total_distance * 100.0
    }

    pub fn is_green(&self) -> bool {
        self.detection_status == DetectionStatus::Green
    }

    pub fn is_yellow(&self) -> bool {
        self.detection_status == DetectionStatus::Yellow
    }

    pub fn is_red(&self) -> bool {
        self.detection_status == DetectionStatus::Red
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Time remaining as mm:ss
    pub fn formatted_time(&self) -> String {
        format_time(self.time_remaining)
    }
}

/// Format whole seconds as mm:ss
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
