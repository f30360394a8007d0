//! Red Light, Green Light - a browser minigame
//!
//! Core modules:
//! - `game`: Game state store, detection cycle and timers
//! - `input`: Movement input gating
//! - `session`: Wires the store, controllers, audio and persistence together
//! - `settings`, `stats`, `highscores`: Persisted player data
//! - `storage`: Key-value persistence (LocalStorage on web)

pub mod audio;
pub mod game;
pub mod highscores;
pub mod input;
pub mod session;
pub mod settings;
pub mod shortcuts;
pub mod stats;
pub mod storage;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::{Difficulty, Settings, Theme};
pub use stats::Stats;

/// Game configuration constants
pub mod consts {
    /// Seconds on the clock at the start of a run
    pub const INITIAL_TIME: u32 = 60;
    /// Distance to the finish line
    pub const FINISH_LINE: f64 = 100.0;
    pub const INITIAL_LIVES: u32 = 3;
    /// Pre-game countdown starts here
    pub const COUNTDOWN_FROM: u32 = 3;

    /// Distance per accepted movement
    pub const MOVE_STEP: f64 = 5.0;
    /// Minimum gap between movements (ms)
    pub const MOVE_COOLDOWN_MS: f64 = 100.0;

    /// Countdown and game clock tick (ms)
    pub const TICK_MS: f64 = 1000.0;

    /// Phase durations (ms, before difficulty scaling)
    pub const MIN_GREEN_MS: f64 = 3000.0;
    pub const MAX_GREEN_MS: f64 = 6000.0;
    pub const YELLOW_MS: f64 = 500.0;
    pub const MIN_RED_MS: f64 = 2000.0;
    pub const MAX_RED_MS: f64 = 4000.0;
}
