//! A play session: the store plus everything that reacts to it
//!
//! The session owns the game store, both controllers, the persisted
//! settings and stats, and the audio sink. The platform layer feeds it
//! elapsed time and input; the renderer reads `state()`.

use std::rc::Rc;

use crate::audio::{AudioSink, NullAudio, SoundEffect};
use crate::game::{
    DetectionCycle, GameConfig, GameEvent, GameState, GameStatus, GameStore, PhaseTiming,
};
use crate::highscores::HighScores;
use crate::input::{InputController, InputEvent, InputOutcome};
use crate::settings::{Difficulty, Settings};
use crate::shortcuts::Shortcut;
use crate::stats::{GameResult, Stats};
use crate::storage::KeyValueStore;

pub struct Session {
    storage: Rc<dyn KeyValueStore>,
    store: GameStore,
    cycle: DetectionCycle,
    input: InputController,
    settings: Settings,
    stats: Stats,
    audio: Box<dyn AudioSink>,
    seed: u64,
    /// Wall-clock time (unix ms) at virtual time 0
    epoch_ms: f64,
    /// Virtual time the current run entered Playing
    run_started_ms: Option<f64>,
    settings_open: bool,
}

impl Session {
    pub fn new(storage: Rc<dyn KeyValueStore>, config: GameConfig, seed: u64) -> Self {
        let settings = Settings::load(storage.as_ref());
        let stats = Stats::load(&*storage);
        let mut store = GameStore::new(config, storage.clone());
        let mut cycle = DetectionCycle::new(seed);
        store.set_difficulty(settings.difficulty);
        cycle.set_difficulty(settings.difficulty);

        Self {
            storage,
            store,
            cycle,
            input: InputController::new(&config),
            settings,
            stats,
            audio: Box::new(NullAudio),
            seed,
            epoch_ms: 0.0,
            run_started_ms: None,
            settings_open: false,
        }
    }

    /// Replace the phase timing bounds
    pub fn with_timing(mut self, timing: PhaseTiming) -> Self {
        self.cycle = DetectionCycle::with_timing(self.seed, timing);
        self.cycle.set_difficulty(self.settings.difficulty);
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    /// Anchor the virtual clock to wall-clock time for stats timestamps
    pub fn with_epoch_ms(mut self, epoch_ms: f64) -> Self {
        self.epoch_ms = epoch_ms;
        self
    }

    pub fn state(&self) -> &GameState {
        self.store.state()
    }

    pub fn status(&self) -> GameStatus {
        self.store.status()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn high_scores(&self) -> &HighScores {
        self.store.high_scores()
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }

    pub fn now_ms(&self) -> f64 {
        self.cycle.now_ms()
    }

    /// Whole seconds spent playing in the current or last run
    pub fn elapsed_secs(&self) -> u32 {
        match self.run_started_ms {
            Some(start) => ((self.cycle.now_ms() - start).max(0.0) / 1000.0).floor() as u32,
            None => 0,
        }
    }

    /// Advance the clock by `dt_ms`
    pub fn update(&mut self, dt_ms: f64) {
        self.cycle.advance(dt_ms, &mut self.store);
        self.process_events();
    }

    /// Start a run from the menu or a results screen. Ignored mid-run.
    pub fn start(&mut self) -> bool {
        match self.store.status() {
            GameStatus::Idle | GameStatus::GameOver | GameStatus::Victory => {
                self.begin_run();
                true
            }
            GameStatus::Countdown | GameStatus::Playing => false,
        }
    }

    /// Abandon whatever is running and start over
    pub fn restart(&mut self) {
        self.begin_run();
    }

    fn begin_run(&mut self) {
        self.input.reset();
        self.run_started_ms = None;
        self.store.start_game();
        self.sync();
    }

    /// Back to the menu
    pub fn reset(&mut self) {
        self.input.reset();
        self.store.reset_game();
        self.sync();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.set_difficulty(difficulty, self.storage.as_ref());
        self.store.set_difficulty(difficulty);
        self.cycle.set_difficulty(difficulty);
    }

    /// Route a movement input through the input controller
    pub fn handle_input(&mut self, event: &InputEvent) -> InputOutcome {
        let now = self.cycle.now_ms();
        let outcome = self
            .input
            .handle(event, now, &mut self.store, self.settings.practice_mode);
        if outcome == InputOutcome::Moved {
            self.cue(SoundEffect::Move);
        }
        self.sync();
        outcome
    }

    /// Handle a key press. Returns true if the key was used.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let event = InputEvent::key(key);
        if event.is_advance() {
            return self.handle_input(&event).consumed();
        }
        match Shortcut::from_key(key) {
            Some(shortcut) => {
                self.apply_shortcut(shortcut);
                true
            }
            None => false,
        }
    }

    pub fn apply_shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::Start => {
                self.start();
            }
            Shortcut::Reset => self.reset(),
            Shortcut::Restart => self.restart(),
            Shortcut::Settings => self.settings_open = !self.settings_open,
            Shortcut::Mute => {
                let on = self.settings.toggle_sound(self.storage.as_ref());
                log::info!("Sound {}", if on { "on" } else { "off" });
            }
            Shortcut::Theme => {
                let theme = self.settings.cycle_theme(self.storage.as_ref());
                log::info!("Theme: {}", theme.as_str());
            }
            Shortcut::Practice => {
                let on = self.settings.toggle_practice_mode(self.storage.as_ref());
                log::info!("Practice mode {}", if on { "on" } else { "off" });
            }
        }
    }

    /// Let the cycle see any status change, then handle queued events
    fn sync(&mut self) {
        self.cycle.observe(&mut self.store);
        self.process_events();
    }

    fn cue(&mut self, effect: SoundEffect) {
        if self.settings.sound_enabled {
            self.audio.play(effect);
        }
    }

    fn process_events(&mut self) {
        for event in self.store.drain_events() {
            match event {
                GameEvent::StatusChanged { to, .. } => match to {
                    GameStatus::Playing => {
                        self.run_started_ms = self.cycle.playing_since_ms();
                        self.cue(SoundEffect::Start);
                    }
                    GameStatus::GameOver => self.record(GameResult::Eliminated),
                    GameStatus::Victory => self.record(GameResult::Win),
                    GameStatus::Idle | GameStatus::Countdown => {}
                },
                GameEvent::LifeLost { .. } => self.cue(SoundEffect::Eliminate),
                GameEvent::Victory { .. } => self.cue(SoundEffect::Win),
                GameEvent::PhaseChanged(_) => {}
            }
        }
    }

    fn record(&mut self, result: GameResult) {
        let distance = self.store.state().distance;
        let elapsed = self.elapsed_secs();
        let timestamp = self.epoch_ms + self.cycle.now_ms();
        self.stats
            .record_game(result, distance, elapsed, timestamp, self.storage.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::DetectionStatus;
    use crate::storage::{MemoryStore, keys};
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<SoundEffect>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().push(effect);
        }
    }

    impl Recorder {
        fn count(&self, effect: SoundEffect) -> usize {
            self.0.borrow().iter().filter(|e| **e == effect).count()
        }
    }

    /// Long green, short red so scripted runs are predictable
    fn slow_timing() -> PhaseTiming {
        PhaseTiming {
            min_green_ms: 10_000.0,
            max_green_ms: 10_000.0,
            yellow_ms: 500.0,
            min_red_ms: 2000.0,
            max_red_ms: 2000.0,
        }
    }

    fn session(storage: Rc<MemoryStore>, config: GameConfig) -> (Session, Recorder) {
        let recorder = Recorder::default();
        let session = Session::new(storage, config, 11)
            .with_timing(slow_timing())
            .with_audio(Box::new(recorder.clone()))
            .with_epoch_ms(1_000_000.0);
        (session, recorder)
    }

    #[test]
    fn test_full_run_to_victory() {
        let storage = Rc::new(MemoryStore::new());
        let (mut s, audio) = session(storage.clone(), GameConfig::default());

        assert!(s.handle_key(" "));
        assert_eq!(s.status(), GameStatus::Countdown);
        s.update(3000.0);
        assert_eq!(s.status(), GameStatus::Playing);
        assert_eq!(audio.count(SoundEffect::Start), 1);

        for _ in 0..20 {
            assert!(s.handle_key("ArrowUp"));
            s.update(100.0);
        }

        assert_eq!(s.status(), GameStatus::Victory);
        let expected = (100.0 + s.state().time_remaining as f64 * 10.0).floor() as u64;
        assert_eq!(s.state().score, expected);
        assert_eq!(audio.count(SoundEffect::Move), 20);
        assert_eq!(audio.count(SoundEffect::Win), 1);
        assert_eq!(s.stats().total_wins, 1);
        assert_eq!(s.stats().best_time, Some(1));
        assert_eq!(s.stats().last_played, Some(1_000_000.0 + 4900.0));
        assert_eq!(s.high_scores().normal, expected);
        assert_eq!(Stats::load(&*storage).total_games, 1);
    }

    #[test]
    fn test_start_ignored_mid_run() {
        let (mut s, _) = session(Rc::new(MemoryStore::new()), GameConfig::default());
        assert!(s.start());
        assert!(!s.start());
        s.update(3000.0);
        assert!(!s.start());
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn test_moving_on_red_costs_lives() {
        let config = GameConfig {
            use_countdown: false,
            ..Default::default()
        };
        let (mut s, audio) = session(Rc::new(MemoryStore::new()), config);
        s.start();
        s.update(10_500.0);
        assert_eq!(s.state().detection_status, DetectionStatus::Red);

        for _ in 0..3 {
            s.handle_key("w");
            s.update(150.0);
        }
        assert_eq!(s.status(), GameStatus::GameOver);
        assert!(s.state().is_eliminated);
        assert_eq!(audio.count(SoundEffect::Eliminate), 3);
        assert_eq!(s.stats().total_eliminations, 1);
        assert_eq!(s.stats().total_games, 1);
    }

    #[test]
    fn test_practice_mode_forgives_red() {
        let config = GameConfig {
            use_countdown: false,
            ..Default::default()
        };
        let (mut s, _) = session(Rc::new(MemoryStore::new()), config);
        assert!(s.handle_key("p"));
        assert!(s.settings().practice_mode);

        s.start();
        s.update(10_500.0);
        assert_eq!(s.handle_input(&InputEvent::Click), InputOutcome::Warned);
        assert_eq!(s.state().lives, 3);
        assert_eq!(s.state().distance, 0.0);
    }

    #[test]
    fn test_mute_silences_cues() {
        let config = GameConfig {
            use_countdown: false,
            ..Default::default()
        };
        let (mut s, audio) = session(Rc::new(MemoryStore::new()), config);
        s.handle_key("M");
        assert!(!s.settings().sound_enabled);
        s.start();
        s.handle_input(&InputEvent::TouchStart);
        assert_eq!(s.state().distance, 5.0);
        assert!(audio.0.borrow().is_empty());
    }

    #[test]
    fn test_escape_returns_to_idle_and_stops_clock() {
        let (mut s, _) = session(Rc::new(MemoryStore::new()), GameConfig::default());
        s.start();
        s.update(5000.0);
        assert_eq!(s.state().time_remaining, 58);

        assert!(s.handle_key("Escape"));
        assert_eq!(s.status(), GameStatus::Idle);
        s.update(10_000.0);
        assert_eq!(s.state().time_remaining, 60);
        assert_eq!(s.stats().total_games, 0);
    }

    #[test]
    fn test_restart_mid_run() {
        let (mut s, _) = session(Rc::new(MemoryStore::new()), GameConfig::default());
        s.start();
        s.update(4000.0);
        s.handle_key("w");
        assert_eq!(s.state().distance, 5.0);

        assert!(s.handle_key("r"));
        assert_eq!(s.status(), GameStatus::Countdown);
        assert_eq!(s.state().distance, 0.0);
        s.update(3000.0);
        assert_eq!(s.status(), GameStatus::Playing);
        assert_eq!(s.state().time_remaining, 60);
    }

    #[test]
    fn test_restart_without_countdown_starts_fresh_run() {
        let config = GameConfig {
            use_countdown: false,
            ..Default::default()
        };
        let (mut s, audio) = session(Rc::new(MemoryStore::new()), config);
        s.start();
        s.update(2000.0);
        s.restart();
        assert_eq!(s.status(), GameStatus::Playing);
        assert_eq!(audio.count(SoundEffect::Start), 2);

        s.update(5000.0);
        for _ in 0..20 {
            s.handle_input(&InputEvent::Click);
            s.update(100.0);
        }
        assert_eq!(s.status(), GameStatus::Victory);
        assert_eq!(s.elapsed_secs(), 7);
        assert_eq!(s.stats().best_time, Some(6));
    }

    #[test]
    fn test_elapsed_counts_from_countdown_end_in_long_frame() {
        let (mut s, _) = session(Rc::new(MemoryStore::new()), GameConfig::default());
        s.start();
        s.update(3500.0);
        assert_eq!(s.status(), GameStatus::Playing);
        s.update(600.0);
        assert_eq!(s.elapsed_secs(), 1);
    }

    #[test]
    fn test_clock_expiry_with_one_life() {
        let config = GameConfig {
            use_countdown: false,
            initial_time: 3,
            initial_lives: 1,
            ..Default::default()
        };
        let (mut s, audio) = session(Rc::new(MemoryStore::new()), config);
        s.start();
        s.update(3000.0);
        assert_eq!(s.status(), GameStatus::GameOver);
        assert_eq!(audio.count(SoundEffect::Eliminate), 1);
        assert_eq!(s.stats().total_eliminations, 1);
    }

    #[test]
    fn test_win_streak_across_runs() {
        let storage = Rc::new(MemoryStore::new());
        let config = GameConfig {
            use_countdown: false,
            ..Default::default()
        };
        let (mut s, _) = session(storage.clone(), config);

        for run in 1..=2 {
            s.start();
            for _ in 0..20 {
                s.handle_input(&InputEvent::Click);
                s.update(100.0);
            }
            assert_eq!(s.status(), GameStatus::Victory);
            assert_eq!(s.state().win_streak, run);
        }

        // Lose the third run
        s.start();
        s.update(10_500.0);
        for _ in 0..3 {
            s.handle_input(&InputEvent::Click);
            s.update(100.0);
        }
        assert_eq!(s.status(), GameStatus::GameOver);
        assert_eq!(s.state().win_streak, 0);
        assert_eq!(storage.get(keys::WIN_STREAK).as_deref(), Some("0"));
    }

    #[test]
    fn test_settings_toggle_and_difficulty_persist() {
        let storage = Rc::new(MemoryStore::new());
        let (mut s, _) = session(storage.clone(), GameConfig::default());
        assert!(s.handle_key("s"));
        assert!(s.settings_open());
        s.handle_key("t");
        s.set_difficulty(Difficulty::Hard);

        let (s2, _) = session(storage, GameConfig::default());
        assert_eq!(s2.settings().difficulty, Difficulty::Hard);
        assert_eq!(s2.state().difficulty, Difficulty::Hard);
        assert_eq!(s2.settings().theme, crate::settings::Theme::Light);
    }

    #[test]
    fn test_unknown_key_not_consumed() {
        let (mut s, _) = session(Rc::new(MemoryStore::new()), GameConfig::default());
        assert!(!s.handle_key("Tab"));
    }
}
