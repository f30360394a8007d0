//! Detection cycle controller
//!
//! Watches the store's status and drives everything time-based:
//! - the pre-game countdown (one tick per second)
//! - the game clock while playing (one tick per second)
//! - the green -> yellow -> red -> green phase loop
//!
//! Time is a virtual millisecond clock moved forward by `advance`, so the
//! browser frame loop and tests drive it the same way. Every timer records
//! the status and run generation it was scheduled under and does nothing if
//! either has changed by the time it fires.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{DetectionStatus, GameStatus};
use super::store::GameStore;
use super::timer::TimerSet;
use crate::consts::*;
use crate::settings::Difficulty;

/// Phase duration bounds in milliseconds (before difficulty scaling)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTiming {
    pub min_green_ms: f64,
    pub max_green_ms: f64,
    pub yellow_ms: f64,
    pub min_red_ms: f64,
    pub max_red_ms: f64,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            min_green_ms: MIN_GREEN_MS,
            max_green_ms: MAX_GREEN_MS,
            yellow_ms: YELLOW_MS,
            min_red_ms: MIN_RED_MS,
            max_red_ms: MAX_RED_MS,
        }
    }
}

/// `(min + r * (max - min)) * modifier` for `r` in [0, 1)
#[inline]
pub fn scaled_duration(min_ms: f64, max_ms: f64, modifier: f64, r: f64) -> f64 {
    (min_ms + r * (max_ms - min_ms)) * modifier
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleTimer {
    CountdownTick,
    ClockTick,
    /// The given phase has run its course
    PhaseEnd(DetectionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Guard {
    status: GameStatus,
    generation: u64,
}

impl Guard {
    fn of(store: &GameStore) -> Self {
        Self {
            status: store.status(),
            generation: store.generation(),
        }
    }

    fn holds(&self, store: &GameStore) -> bool {
        *self == Self::of(store)
    }
}

pub struct DetectionCycle {
    timers: TimerSet<(CycleTimer, Guard)>,
    rng: Pcg32,
    timing: PhaseTiming,
    difficulty: Difficulty,
    now_ms: f64,
    observed: Option<Guard>,
    /// Virtual time the latest run entered Playing
    playing_since_ms: Option<f64>,
}

impl DetectionCycle {
    pub fn new(seed: u64) -> Self {
        Self::with_timing(seed, PhaseTiming::default())
    }

    pub fn with_timing(seed: u64, timing: PhaseTiming) -> Self {
        Self {
            timers: TimerSet::new(),
            rng: Pcg32::seed_from_u64(seed),
            timing,
            difficulty: Difficulty::Normal,
            now_ms: 0.0,
            observed: None,
            playing_since_ms: None,
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// When the latest run entered Playing. During `advance` this is the
    /// moment the countdown ran out, not the end of the frame.
    pub fn playing_since_ms(&self) -> Option<f64> {
        self.playing_since_ms
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Takes effect from the next sampled phase
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn green_duration(&mut self) -> f64 {
        let r: f64 = self.rng.random();
        scaled_duration(
            self.timing.min_green_ms,
            self.timing.max_green_ms,
            self.difficulty.modifier(),
            r,
        )
    }

    pub fn red_duration(&mut self) -> f64 {
        let r: f64 = self.rng.random();
        scaled_duration(
            self.timing.min_red_ms,
            self.timing.max_red_ms,
            self.difficulty.modifier(),
            r,
        )
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            log::debug!("Cancelling {} timers", self.timers.len());
        }
        self.timers.cancel_all();
    }

    /// React to a status or run change since the last look
    pub fn observe(&mut self, store: &mut GameStore) {
        let current = Guard::of(store);
        if self.observed == Some(current) {
            return;
        }
        self.cancel_all();
        self.observed = Some(current);

        match current.status {
            GameStatus::Countdown => {
                self.schedule(TICK_MS, CycleTimer::CountdownTick, current);
            }
            GameStatus::Playing => {
                self.playing_since_ms = Some(self.now_ms);
                store.set_detection_status(DetectionStatus::Green);
                self.schedule(TICK_MS, CycleTimer::ClockTick, current);
                let green = self.green_duration();
                self.schedule(green, CycleTimer::PhaseEnd(DetectionStatus::Green), current);
            }
            GameStatus::Idle | GameStatus::GameOver | GameStatus::Victory => {}
        }
    }

    /// Move the clock forward, firing due timers in order
    pub fn advance(&mut self, dt_ms: f64, store: &mut GameStore) {
        self.observe(store);
        let target = self.now_ms + dt_ms.max(0.0);
        while let Some(timer) = self.timers.pop_due(target) {
            self.now_ms = timer.due_ms.max(self.now_ms);
            let (kind, guard) = timer.kind;
            self.fire(kind, guard, store);
            self.observe(store);
        }
        self.now_ms = target;
    }

    fn schedule(&mut self, delay_ms: f64, kind: CycleTimer, guard: Guard) {
        log::trace!("Timer {:?} in {:.0}ms", kind, delay_ms);
        self.timers.schedule(self.now_ms + delay_ms, (kind, guard));
    }

    fn fire(&mut self, kind: CycleTimer, guard: Guard, store: &mut GameStore) {
        if !guard.holds(store) {
            log::debug!("Dropping stale {:?}", kind);
            return;
        }

        match kind {
            CycleTimer::CountdownTick => {
                let n = store.state().countdown.saturating_sub(1);
                store.set_countdown(n);
                if n > 0 && guard.holds(store) {
                    self.schedule(TICK_MS, CycleTimer::CountdownTick, guard);
                }
            }
            CycleTimer::ClockTick => {
                let t = store.state().time_remaining as i64;
                store.set_time_remaining(t - 1);
                if guard.holds(store) {
                    self.schedule(TICK_MS, CycleTimer::ClockTick, guard);
                }
            }
            CycleTimer::PhaseEnd(DetectionStatus::Green) => {
                log::debug!("Yellow light");
                store.set_detection_status(DetectionStatus::Yellow);
                self.schedule(
                    self.timing.yellow_ms,
                    CycleTimer::PhaseEnd(DetectionStatus::Yellow),
                    guard,
                );
            }
            CycleTimer::PhaseEnd(DetectionStatus::Yellow) => {
                log::debug!("Red light");
                store.set_detection_status(DetectionStatus::Red);
                let red = self.red_duration();
                self.schedule(red, CycleTimer::PhaseEnd(DetectionStatus::Red), guard);
            }
            CycleTimer::PhaseEnd(DetectionStatus::Red) => {
                log::debug!("Green light");
                store.set_detection_status(DetectionStatus::Green);
                store.next_round();
                let green = self.green_duration();
                self.schedule(green, CycleTimer::PhaseEnd(DetectionStatus::Green), guard);
            }
        }
    }
}
