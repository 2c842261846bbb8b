//! Space Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, MouseEvent};

    use space_runner::consts::*;
    use space_runner::platform::{
        InputAction, KeyValueStore, LocalStore, MemoryStore, StorageError, time,
    };
    use space_runner::renderer::Renderer;
    use space_runner::session::{FollowUp, RunSummary, Screen};
    use space_runner::settings::CameraMode;
    use space_runner::shop::CATALOG;
    use space_runner::sim::{Character, GameState, Level, Notice, Progress};
    use space_runner::{GameSession, ProfileStore, Tuning};

    /// LocalStorage, or memory when the browser blocks it (private mode)
    enum BrowserStore {
        Local(LocalStore),
        Memory(MemoryStore),
    }

    impl KeyValueStore for BrowserStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match self {
                BrowserStore::Local(s) => s.get(key),
                BrowserStore::Memory(s) => s.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            match self {
                BrowserStore::Local(s) => s.set(key, value),
                BrowserStore::Memory(s) => s.set(key, value),
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if hidden {
                classes.add_1("hidden")
            } else {
                classes.remove_1("hidden")
            };
        }
    }

    fn css_color(color: u32) -> String {
        format!("#{:06x}", color)
    }

    /// HUD, toasts and overlays in the page DOM
    struct DomRenderer {
        document: Document,
        last_score: Option<u64>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl DomRenderer {
        fn new(document: Document) -> Self {
            Self {
                document,
                last_score: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                self.fps = (60000.0 / (time - oldest)).round() as u32;
            }
        }
    }

    impl Renderer for DomRenderer {
        fn spawn_player(&mut self, character: Character, _size: glam::Vec3, tint: Option<u32>) {
            if let Some(el) = self.document.get_element_by_id("runner") {
                let _ = el.set_attribute("data-character", character.id());
                let style = tint
                    .map(|c| format!("--tint: {}", css_color(c)))
                    .unwrap_or_default();
                let _ = el.set_attribute("style", &style);
            }
            set_hidden(&self.document, "hud", false);
            set_hidden(&self.document, "menu", true);
        }

        fn spawn_obstacle(&mut self, obstacle: &space_runner::sim::Obstacle, _colliders: &[space_runner::sim::Aabb]) {
            log::debug!("Draw {:?} #{}", obstacle.kind, obstacle.id);
        }

        fn tint_player(&mut self, color: u32) {
            if let Some(el) = self.document.get_element_by_id("runner") {
                let _ = el.set_attribute("style", &format!("--tint: {}", css_color(color)));
            }
        }

        fn set_background(&mut self, color: u32) {
            if let Some(body) = self.document.body() {
                let _ = body.set_attribute("style", &format!("background: {}", css_color(color)));
            }
        }

        fn set_camera(&mut self, mode: CameraMode) {
            if let Some(body) = self.document.body() {
                let classes = body.class_list();
                let _ = match mode {
                    CameraMode::FirstPerson => classes.add_1("first-person"),
                    CameraMode::ThirdPerson => classes.remove_1("first-person"),
                };
            }
        }

        fn show_fps(&mut self, visible: bool) {
            set_hidden(&self.document, "hud-fps", !visible);
        }

        fn show_notice(&mut self, notice: &Notice) {
            set_text(&self.document, "toast", &notice.message());
            set_hidden(&self.document, "toast", false);

            let document = self.document.clone();
            let hide = Closure::once_into_js(move || set_hidden(&document, "toast", true));
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    hide.unchecked_ref(),
                    notice.duration_ms() as i32,
                );
            }
        }

        fn show_paused(&mut self, paused: bool) {
            set_hidden(&self.document, "pause-menu", !paused);
        }

        fn show_game_over(&mut self, summary: &RunSummary) {
            set_text(&self.document, "game-over-reason", summary.reason.message());
            set_text(&self.document, "final-score", &summary.score.to_string());
            set_text(&self.document, "final-high-score", &summary.high_score.to_string());
            set_text(&self.document, "unlock-messages", &summary.unlock_messages().join("\n"));
            let offer = summary.follow_up.map(|f| match f {
                FollowUp::PlayLevelWith(level, character) => {
                    format!("Play Level {} with {}", level.number(), character.name())
                }
                FollowUp::PlayLevel(level) => format!("Play Level {}", level.number()),
                FollowUp::TryCharacter(character) => format!("Try {}", character.name()),
            });
            set_text(&self.document, "follow-up-btn", offer.as_deref().unwrap_or(""));
            set_hidden(&self.document, "follow-up-btn", offer.is_none());
            set_hidden(&self.document, "game-over", false);
        }

        fn update(&mut self, state: &GameState, time: f64) {
            self.track_fps(time);
            if self.last_score != Some(state.score) {
                set_text(&self.document, "hud-score", &state.score.to_string());
                self.last_score = Some(state.score);
            }
            set_text(&self.document, "hud-level", &state.level.number().to_string());
            if state.level.has_stages() {
                set_text(
                    &self.document,
                    "hud-stage",
                    &state.internal_level.saturating_sub(2).to_string(),
                );
            }
            set_text(&self.document, "hud-fps", &self.fps.to_string());
            set_hidden(
                &self.document,
                "ability-hint",
                !state.character().has_singularity() || state.singularity.is_used(),
            );
        }

        fn clear(&mut self) {
            self.last_score = None;
            set_hidden(&self.document, "game-over", true);
            set_hidden(&self.document, "pause-menu", true);
            set_hidden(&self.document, "toast", true);
        }
    }

    type Session = GameSession<BrowserStore, DomRenderer>;

    /// Game instance holding all state
    struct Game {
        session: Session,
        last_time: f64,
    }

    impl Game {
        /// Redraw menu, shop and quest panels from the profile
        fn refresh_menu(&self) {
            let session = &self.session;
            let document = &session.renderer().document;
            let profile = session.profile();
            let in_menu = matches!(
                session.screen(),
                Screen::Menu | Screen::Shop | Screen::Quests
            );
            set_hidden(document, "menu", !in_menu);
            set_hidden(document, "hud", in_menu);
            set_hidden(document, "shop", session.screen() != Screen::Shop);
            set_hidden(document, "quests", session.screen() != Screen::Quests);

            for level in Level::ALL {
                let id = format!("level-{}", level.number());
                if let Some(el) = document.get_element_by_id(&id) {
                    let classes = el.class_list();
                    let _ = classes.toggle_with_force("locked", !profile.is_level_unlocked(level));
                    let _ = classes
                        .toggle_with_force("selected", level == session.selected_level());
                }
                let best = profile.high_scores().get(level);
                set_text(document, &format!("{}-best", id), &best.to_string());
            }
            let top = match profile.high_scores().top_score() {
                Some((level, score)) => format!("{} (Level {})", score, level.number()),
                None => "-".to_string(),
            };
            set_text(document, "best-overall", &top);

            let character = session.selected_character();
            let label = if session.is_selected_character_unlocked() {
                character.name().to_string()
            } else {
                format!("{} (reach Level {})", character.name(), character.unlock_level().number())
            };
            set_text(document, "character-name", &label);
            set_text(document, "currency", &profile.currency().to_string());

            let quests: Vec<String> = profile
                .quests()
                .quests
                .iter()
                .map(|q| {
                    let status = match (q.done, q.claimed) {
                        (_, true) => "claimed",
                        (true, false) => "complete",
                        (false, false) => "",
                    };
                    format!(
                        "{} ({}/{}) {}",
                        q.kind.describe(q.target),
                        q.progress(),
                        q.target,
                        status
                    )
                })
                .collect();
            set_text(document, "quest-list", &quests.join("\n"));

            for item in CATALOG {
                let id = format!("buy-{}", item.id);
                let owned = profile.wardrobe().owns(item.id);
                let equipped = profile.wardrobe().equipped.as_deref() == Some(item.id);
                let text = match (owned, equipped) {
                    (_, true) => format!("{} (equipped)", item.name),
                    (true, false) => format!("{} (equip)", item.name),
                    (false, _) => format!("{} - {}", item.name, item.price),
                };
                set_text(document, &id, &text);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Runner starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let store = match LocalStore::open() {
            Ok(store) => BrowserStore::Local(store),
            Err(e) => {
                log::warn!("{}; progress will not be saved", e);
                BrowserStore::Memory(MemoryStore::new())
            }
        };

        // Optional balance overrides embedded in the page
        let tuning = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default();

        let seed = time::now_ms();
        let mut rng = <rand_pcg::Pcg32 as rand::SeedableRng>::seed_from_u64(seed);
        let profile = ProfileStore::load(store, &time::today(), &mut rng);
        let session = GameSession::new(profile, DomRenderer::new(document.clone()), tuning, seed);
        let game = Rc::new(RefCell::new(Game {
            session,
            last_time: 0.0,
        }));
        game.borrow().refresh_menu();

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_menu(&document, game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Space Runner running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(action) = InputAction::from_code(&event.code()) else {
                    return;
                };
                if action.prevents_default() {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                g.session.key_down(action);
                if action == InputAction::Reset {
                    g.refresh_menu();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(action) = InputAction::from_code(&event.code()) {
                    game.borrow_mut().session.key_up(action);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Attach a click handler that refreshes the menu afterwards
    fn on_click(
        document: &Document,
        id: &str,
        game: Rc<RefCell<Game>>,
        mut action: impl FnMut(&mut Session) + 'static,
    ) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            action(&mut g.session);
            g.refresh_menu();
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu(document: &Document, game: Rc<RefCell<Game>>) {
        for level in Level::ALL {
            on_click(document, &format!("level-{}", level.number()), game.clone(), move |s| {
                s.select_level(level);
            });
        }
        on_click(document, "prev-character", game.clone(), |s| {
            s.prev_character();
        });
        on_click(document, "next-character", game.clone(), |s| {
            s.next_character();
        });
        on_click(document, "start-btn", game.clone(), |s| {
            s.start_run();
        });
        on_click(document, "shop-btn", game.clone(), |s| {
            s.toggle_shop();
        });
        on_click(document, "quests-btn", game.clone(), |s| {
            s.toggle_quests();
        });
        on_click(document, "fps-btn", game.clone(), |s| s.toggle_fps());
        on_click(document, "claim-btn", game.clone(), |s| {
            s.profile_mut().claim_all_quests();
        });
        on_click(document, "resume-btn", game.clone(), |s| {
            s.resume();
        });
        on_click(document, "restart-btn", game.clone(), |s| {
            s.reset();
        });
        on_click(document, "menu-btn", game.clone(), |s| s.back_to_menu());
        on_click(document, "game-over-menu-btn", game.clone(), |s| s.back_to_menu());
        on_click(document, "follow-up-btn", game.clone(), |s| {
            s.accept_follow_up();
        });

        for item in CATALOG {
            on_click(document, &format!("buy-{}", item.id), game.clone(), move |s| {
                let profile = s.profile_mut();
                if !profile.wardrobe().owns(item.id) {
                    if let Err(e) = profile.purchase(item.id) {
                        log::info!("{}", e);
                        return;
                    }
                }
                if profile.wardrobe().equipped.as_deref() == Some(item.id) {
                    profile.unequip();
                } else if let Err(e) = profile.equip(item.id) {
                    log::warn!("{}", e);
                }
            });
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().session.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if game.borrow_mut().session.pause() {
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            let before = g.session.screen();
            g.session.frame(dt, time);
            if g.session.screen() != before {
                // Unlocks and high scores changed
                g.refresh_menu();
            }
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
    log::info!("Space Runner (native) starting...");
    log::info!("Native mode is headless - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(space_runner::platform::time::now_ms);
    autopilot(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one level-1 run with a simple jump-when-blocked pilot and print the result
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(seed: u64) {
    use rand::SeedableRng;
    use space_runner::consts::SIM_DT;
    use space_runner::platform::{InputAction, MemoryStore, time};
    use space_runner::renderer::NullRenderer;
    use space_runner::{GameSession, ProfileStore, Tuning};

    let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
    let profile = ProfileStore::load(MemoryStore::new(), &time::today(), &mut rng);
    let mut session = GameSession::new(profile, NullRenderer, Tuning::default(), seed);
    session.start_run();

    // Ten minutes of game time at most
    for frame in 0..36_000u32 {
        let Some(state) = session.state() else {
            break;
        };
        if state.is_game_over() {
            break;
        }

        let player = state.player.collider();
        let t = state.elapsed;
        let blocked = state
            .obstacles
            .iter()
            .filter(|o| o.is_armed())
            .flat_map(|o| o.colliders_at(t))
            .any(|b| {
                let ahead = player.center.z - b.center.z;
                ahead > 0.0
                    && ahead < 4.0
                    && (b.center.x - player.center.x).abs() * 2.0 < b.size.x + player.size.x
            });
        let drift = player.center.x;

        if blocked {
            session.key_down(InputAction::Jump);
        }
        for (held, action) in [
            (drift > 0.5, InputAction::SteerLeft),
            (drift < -0.5, InputAction::SteerRight),
        ] {
            if held {
                session.key_down(action);
            } else {
                session.key_up(action);
            }
        }

        session.frame(SIM_DT, frame as f64 * SIM_DT as f64 * 1000.0);
    }

    match session.summary() {
        Some(summary) => {
            println!("\n{} Final score: {}", summary.reason.message(), summary.score);
            for line in summary.unlock_messages() {
                println!("  {}", line);
            }
        }
        None => println!(
            "\nStill running after the time limit, score {}",
            session.state().map(|s| s.score).unwrap_or(0)
        ),
    }
}
