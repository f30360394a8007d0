//! Audio cues
//!
//! The game only names the cue to play; a sink decides how. The browser
//! build synthesizes them with Web Audio (`web::AudioManager`).

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Accepted step forward
    Move,
    /// Life lost
    Eliminate,
    /// Finish line crossed
    Win,
    /// Run enters play
    Start,
}

/// Fire-and-forget cue player
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Plays nothing (native builds)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}
