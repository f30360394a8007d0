//! Core game state machine
//!
//! - `store`: the single writer of `GameState`
//! - `cycle`: countdown, game clock and the green/yellow/red phase loop
//! - `timer`: owned, cancellable timers for the cycle controller
//!
//! Nothing in here touches the DOM, audio or rendering.

pub mod cycle;
pub mod state;
pub mod store;
pub mod timer;

pub use cycle::{DetectionCycle, PhaseTiming, scaled_duration};
pub use state::{DetectionStatus, GameConfig, GameState, GameStatus, format_time};
pub use store::{GameEvent, GameStore};
pub use timer::{Timer, TimerId, TimerSet};
