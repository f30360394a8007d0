//! Web Audio cue synthesis
//!
//! Procedurally generated, no asset downloads.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{AudioSink, SoundEffect};

/// Output level applied to every cue
const MASTER_VOLUME: f32 = 0.8;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    fn osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Single enveloped note starting `delay` seconds from now
    fn note(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, level: f32, delay: f64, len: f64) {
        let Some((osc, gain)) = self.osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;
        gain.gain().set_value_at_time(MASTER_VOLUME * level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + len)
            .ok();
        osc.start_with_when(t).ok();
        osc.stop_with_when(t + len + 0.05).ok();
    }

    /// Footstep - short low tick
    fn play_move(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(MASTER_VOLUME * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.06)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 0.06)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.08).ok();
    }

    /// Caught - harsh buzz falling away
    fn play_eliminate(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.osc(ctx, 300.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(MASTER_VOLUME * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.6)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.7).ok();
    }

    /// Victory - rising arpeggio
    fn play_win(&self, ctx: &AudioContext) {
        for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
            self.note(ctx, *freq, OscillatorType::Triangle, 0.3, i as f64 * 0.1, 0.35);
        }
    }

    /// Go - two quick beeps
    fn play_start(&self, ctx: &AudioContext) {
        self.note(ctx, 660.0, OscillatorType::Square, 0.15, 0.0, 0.1);
        self.note(ctx, 880.0, OscillatorType::Square, 0.15, 0.15, 0.15);
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, effect: SoundEffect) {
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Move => self.play_move(ctx),
            SoundEffect::Eliminate => self.play_eliminate(ctx),
            SoundEffect::Win => self.play_win(ctx),
            SoundEffect::Start => self.play_start(ctx),
        }
    }
}
