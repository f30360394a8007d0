//! Movement input handling
//!
//! Turns advance key presses, taps and clicks into `move_forward` calls,
//! at most one per cooldown window, and only while the player is allowed
//! to move.

use crate::game::{GameConfig, GameStore};

/// Keys that move the player forward
pub const ADVANCE_KEYS: [&str; 3] = ["ArrowUp", "w", "W"];

/// Raw input delivered by the platform layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown { key: String },
    TouchStart,
    Click,
}

impl InputEvent {
    pub fn key(key: &str) -> Self {
        InputEvent::KeyDown {
            key: key.to_string(),
        }
    }

    /// Whether this event asks to move forward
    pub fn is_advance(&self) -> bool {
        match self {
            InputEvent::KeyDown { key } => ADVANCE_KEYS.contains(&key.as_str()),
            InputEvent::TouchStart | InputEvent::Click => true,
        }
    }
}

/// What happened to an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Not a movement control; left for other handlers
    Ignored,
    /// Not playing, or already eliminated
    Blocked,
    /// Too soon after the previous movement
    CoolingDown,
    Moved,
    /// Moved on red in practice mode: warning only
    Warned,
    /// Moved on red: a life was lost
    Caught,
}

impl InputOutcome {
    /// True when the platform should suppress the default action
    pub fn consumed(&self) -> bool {
        *self != InputOutcome::Ignored
    }
}

#[derive(Debug, Clone)]
pub struct InputController {
    step: f64,
    cooldown_ms: f64,
    last_move_ms: Option<f64>,
}

impl InputController {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            step: config.move_step,
            cooldown_ms: config.move_cooldown_ms,
            last_move_ms: None,
        }
    }

    /// Forget the cooldown anchor (new run)
    pub fn reset(&mut self) {
        self.last_move_ms = None;
    }

    fn cooling_down(&self, now_ms: f64) -> bool {
        match self.last_move_ms {
            Some(last) => now_ms - last < self.cooldown_ms,
            None => false,
        }
    }

    pub fn handle(
        &mut self,
        event: &InputEvent,
        now_ms: f64,
        store: &mut GameStore,
        practice_mode: bool,
    ) -> InputOutcome {
        if !event.is_advance() {
            return InputOutcome::Ignored;
        }

        let state = store.state();
        if !state.is_playing() || state.is_eliminated {
            return InputOutcome::Blocked;
        }
        if self.cooling_down(now_ms) {
            return InputOutcome::CoolingDown;
        }

        self.last_move_ms = Some(now_ms);

        if state.is_red() {
            if practice_mode {
                log::info!("Moved on red light (practice mode)");
                return InputOutcome::Warned;
            }
            log::info!("Caught moving on red light");
            store.eliminate();
            return InputOutcome::Caught;
        }

        store.move_forward(self.step);
        InputOutcome::Moved
    }
}
