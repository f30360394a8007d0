//! Red Light, Green Light entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, MouseEvent, TouchEvent};

    use red_light::Session;
    use red_light::audio::AudioManager;
    use red_light::game::{DetectionStatus, GameConfig, GameStatus};
    use red_light::input::InputEvent;
    use red_light::shortcuts::Shortcut;
    use red_light::storage::LocalStorage;

    /// Longest frame step fed to the clock (ms)
    const MAX_FRAME_MS: f64 = 100.0;

    /// Game instance holding all state
    struct Game {
        session: Session,
        last_time: f64,
        // Skip DOM writes when nothing visible changed
        last_hud: String,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let storage = Rc::new(LocalStorage::new());
            let session = Session::new(storage, GameConfig::default(), seed)
                .with_audio(Box::new(AudioManager::new()))
                .with_epoch_ms(js_sys::Date::now());
            Self {
                session,
                last_time: 0.0,
                last_hud: String::new(),
            }
        }

        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(MAX_FRAME_MS)
            } else {
                0.0
            };
            self.last_time = time;
            self.session.update(dt);
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let state = self.session.state();
            let settings = self.session.settings();
            let key = format!(
                "{:?}|{}|{}|{}|{:.1}|{:?}|{}|{:?}|{}",
                state.status,
                state.countdown,
                state.time_remaining,
                state.lives,
                state.distance,
                state.detection_status,
                settings.sound_enabled,
                settings.theme,
                self.session.settings_open(),
            );
            if key == self.last_hud {
                return;
            }
            self.last_hud = key;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            set_text(&document, "hud-time", &state.formatted_time());
            set_text(&document, "hud-lives", &state.lives.to_string());
            set_text(
                &document,
                "hud-distance",
                &format!("{:.0}%", state.progress_percent()),
            );
            set_text(&document, "hud-round", &state.round.to_string());
            set_text(&document, "hud-high-score", &state.high_score.to_string());
            set_text(&document, "hud-streak", &state.win_streak.to_string());

            if let Some(el) = document.get_element_by_id("player") {
                let _ = el.set_attribute(
                    "style",
                    &format!("bottom: {:.1}%", state.progress_percent()),
                );
            }

            if let Some(el) = document.get_element_by_id("light") {
                let class = match state.detection_status {
                    DetectionStatus::Green => "light green",
                    DetectionStatus::Yellow => "light yellow",
                    DetectionStatus::Red => "light red",
                };
                let _ = el.set_attribute("class", class);
            }

            set_visible(&document, "menu", state.status == GameStatus::Idle);
            set_visible(&document, "countdown", state.status == GameStatus::Countdown);
            set_text(&document, "countdown", &state.countdown.to_string());
            set_visible(&document, "hud", state.is_playing());
            set_visible(&document, "game-over", state.status == GameStatus::GameOver);
            set_visible(&document, "victory", state.status == GameStatus::Victory);
            if state.status.is_finished() {
                set_text(&document, "final-score", &state.score.to_string());
                set_text(&document, "final-time", &self.session.elapsed_secs().to_string());
            }
            set_visible(&document, "settings-panel", self.session.settings_open());
            set_text(
                &document,
                "sound-state",
                if settings.sound_enabled { "On" } else { "Off" },
            );

            if let Some(body) = document.body() {
                let _ = body.set_attribute("class", &format!("theme-{}", settings.theme.as_str()));
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = if visible {
                el.class_list().remove_1("hidden")
            } else {
                el.class_list().add_1("hidden")
            };
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Red Light, Green Light starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        fill_shortcut_help(&document);
        setup_input_handlers(&document, game.clone());
        setup_buttons(&document, game.clone());

        request_animation_frame(game);

        log::info!("Red Light, Green Light running!");
    }

    fn fill_shortcut_help(document: &Document) {
        let Some(el) = document.get_element_by_id("shortcut-help") else {
            return;
        };
        let lines: Vec<String> = Shortcut::ALL
            .iter()
            .map(|s| format!("{}: {}", s.label(), s.description()))
            .collect();
        el.set_text_content(Some(&lines.join("\n")));
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        // Keyboard: movement and shortcuts
        {
            let game = game.clone();
            let window = web_sys::window().expect("no window");
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                if game.borrow_mut().session.handle_key(&event.key()) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch and click only count inside the play area so buttons keep working
        let Some(area) = document.get_element_by_id("play-area") else {
            log::warn!("No #play-area element - touch and click movement disabled");
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let outcome = game.borrow_mut().session.handle_input(&InputEvent::TouchStart);
                if outcome.consumed() {
                    event.prevent_default();
                }
            });
            let _ = area
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let outcome = game.borrow_mut().session.handle_input(&InputEvent::Click);
                if outcome.consumed() {
                    event.prevent_default();
                }
            });
            let _ = area.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let bindings: [(&str, fn(&mut Session)); 4] = [
            ("start-btn", |s| {
                s.start();
            }),
            ("restart-btn", |s| s.restart()),
            ("menu-btn", |s| s.reset()),
            ("sound-btn", |s| {
                s.apply_shortcut(Shortcut::Mute)
            }),
        ];

        for (id, action) in bindings {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                action(&mut game.borrow_mut().session);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for difficulty in red_light::Difficulty::ALL {
            let id = format!("difficulty-{}", difficulty.as_str());
            let Some(btn) = document.get_element_by_id(&id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().session.set_difficulty(difficulty);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Red Light, Green Light (native) starting...");
    log::info!("Native mode is a headless demo - serve the wasm build for the real game");

    autoplay_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one run with a bot that only moves on green
#[cfg(not(target_arch = "wasm32"))]
fn autoplay_demo() {
    use std::rc::Rc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use red_light::Session;
    use red_light::game::GameConfig;
    use red_light::input::InputEvent;
    use red_light::storage::MemoryStore;

    const FRAME_MS: f64 = 50.0;
    const MAX_MS: f64 = 120_000.0;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0);
    let mut session =
        Session::new(Rc::new(MemoryStore::new()), GameConfig::default(), now as u64).with_epoch_ms(now);

    session.start();
    while !session.status().is_finished() && session.now_ms() < MAX_MS {
        session.update(FRAME_MS);
        if session.state().is_green() {
            session.handle_input(&InputEvent::Click);
        }
    }

    let state = session.state();
    println!(
        "Run finished: {:?} after {}s, distance {:.0}/{:.0}, score {}, lives {}",
        state.status,
        session.elapsed_secs(),
        state.distance,
        state.total_distance,
        state.score,
        state.lives
    );
}
