//! 2048 Nexus entry point
//!
//! The browser build wires DOM events into a [`Session`]. The native build
//! plays one seeded game headlessly and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, MouseEvent, TouchEvent};

    use nexus_2048::leaderboard::format_date;
    use nexus_2048::persistence::LocalStorage;
    use nexus_2048::platform::{InputAction, SwipeTracker, decode_button, decode_key, now_ms};
    use nexus_2048::renderer::{BoardView, EndScreen, Hud, ParticleBurst};
    use nexus_2048::session::Update;
    use nexus_2048::sim::GameStatus;
    use nexus_2048::{Achievement, Session};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorage>,
        swipe: SwipeTracker,
    }

    impl Game {
        fn input(&mut self, action: InputAction) {
            let update = self.session.input(action, now_ms());
            self.present(update);
        }

        /// Push one update to the DOM
        fn present(&mut self, update: Update) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(board) = &update.board {
                draw_board(&document, board);
            }
            if !update.particles.is_empty() {
                draw_particles(&document, &update.particles, self.session.state.board_size());
            }
            for toast in &update.toasts {
                show_toast(&document, toast);
            }
            if update.rank.is_some() || !update.unlocked.is_empty() {
                self.draw_records(&document);
            }

            self.update_hud(&document);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document) {
            let hud = Hud::from_state(&self.session.state);

            set_text(document, "score", &hud.score.to_string());
            set_text(document, "best", &hud.best.to_string());
            set_text(document, "moves", &hud.moves.to_string());
            set_text(
                document,
                "highest-tile",
                &hud.highest_tile.map_or("-".to_string(), |t| t.to_string()),
            );
            set_text(document, "best-combo", &format!("×{}", hud.best_combo.max(1)));
            set_text(
                document,
                "efficiency",
                &hud.efficiency.map_or("-".to_string(), |e| e.to_string()),
            );

            // Timer (time attack only)
            if let Some(el) = document.get_element_by_id("timer") {
                match &hud.timer {
                    Some(text) => {
                        el.set_text_content(Some(text));
                        let class = if hud.timer_urgent { "timer urgent" } else { "timer" };
                        let _ = el.set_attribute("class", class);
                    }
                    None => {
                        let _ = el.set_attribute("class", "timer hidden");
                    }
                }
            }

            // Combo banner (only shown for 2+)
            if let Some(el) = document.get_element_by_id("combo-banner") {
                match &hud.combo_banner {
                    Some(text) => {
                        el.set_text_content(Some(text));
                        let _ = el.set_attribute("class", "combo-banner show");
                    }
                    None => {
                        let _ = el.set_attribute("class", "combo-banner");
                    }
                }
            }

            if let Some(el) = document.get_element_by_id("btn-undo") {
                if hud.undo_enabled {
                    let _ = el.remove_attribute("disabled");
                } else {
                    let _ = el.set_attribute("disabled", "");
                }
            }

            // End-of-game modal
            if let Some(modal) = document.get_element_by_id("modal") {
                match EndScreen::from_state(&self.session.state) {
                    Some(screen) => {
                        set_text(document, "modal-title", screen.title);
                        set_text(document, "modal-score", &screen.score.to_string());
                        set_text(document, "modal-message", &screen.message);
                        if let Some(btn) = document.get_element_by_id("btn-continue-modal") {
                            let class = if screen.can_continue { "" } else { "hidden" };
                            let _ = btn.set_attribute("class", class);
                        }
                        let _ = modal.set_attribute("class", "modal show");
                    }
                    None => {
                        let _ = modal.set_attribute("class", "modal");
                    }
                }
            }

            self.update_chips(document);
        }

        /// Highlight the selected board size and mode
        fn update_chips(&self, document: &Document) {
            let settings = &self.session.settings;
            let selected = [
                ("size-btns", "data-size", settings.board_size.to_string()),
                ("mode-btns", "data-mode", settings.mode.as_str().to_string()),
            ];
            for (group, attr, value) in selected {
                let Some(container) = document.get_element_by_id(group) else {
                    continue;
                };
                let chips = container.children();
                for i in 0..chips.length() {
                    if let Some(chip) = chips.item(i) {
                        let on = chip.get_attribute(attr).as_deref() == Some(value.as_str());
                        let _ = chip.class_list().toggle_with_force("active", on);
                    }
                }
            }
        }

        /// Leaderboard and achievement lists
        fn draw_records(&self, document: &Document) {
            if let Some(list) = document.get_element_by_id("leaderboard-list") {
                let html: String = self
                    .session
                    .leaderboard
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        format!(
                            "<li><span>#{}</span><span>{}</span><span>{}</span><span>{}</span></li>",
                            i + 1,
                            e.score,
                            e.label(),
                            format_date(e.timestamp)
                        )
                    })
                    .collect();
                list.set_inner_html(&html);
            }

            if let Some(list) = document.get_element_by_id("achievement-list") {
                let html: String = Achievement::ALL
                    .iter()
                    .map(|a| {
                        let class = if self.session.achievements.is_unlocked(*a) {
                            "achievement unlocked"
                        } else {
                            "achievement"
                        };
                        format!(r#"<li class="{}" data-id="{}">{}</li>"#, class, a.id(), a.name())
                    })
                    .collect();
                list.set_inner_html(&html);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn draw_board(document: &Document, board: &BoardView) {
        if let Some(el) = document.get_element_by_id("board") {
            let _ = el.set_attribute("class", &format!("board {}", board.board_class()));
            el.set_inner_html(&board.to_html());
        }
    }

    /// Scatter particle elements over the merged cells. CSS animates them out.
    fn draw_particles(document: &Document, bursts: &[ParticleBurst], size: usize) {
        let Some(layer) = document.get_element_by_id("particles") else {
            return;
        };
        let cell = 100.0 / size as f64;
        let mut html = String::new();
        for burst in bursts {
            let cx = (burst.col as f64 + 0.5) * cell;
            let cy = (burst.row as f64 + 0.5) * cell;
            for _ in 0..burst.count {
                let angle = js_sys::Math::random() * std::f64::consts::TAU;
                let dist = 30.0 + js_sys::Math::random() * 50.0;
                html.push_str(&format!(
                    r#"<i class="particle" style="left:{:.1}%;top:{:.1}%;background:{};--dx:{:.0}px;--dy:{:.0}px"></i>"#,
                    cx,
                    cy,
                    burst.color,
                    angle.cos() * dist,
                    angle.sin() * dist
                ));
            }
        }
        layer.set_inner_html(&html);
    }

    fn show_toast(document: &Document, text: &str) {
        if let Some(el) = document.get_element_by_id("toast") {
            el.set_text_content(Some(text));
            let _ = el.set_attribute("class", "toast show");
        }
        log::info!("{}", text);
    }

    fn random_seed() -> u64 {
        js_sys::Date::now() as u64 ^ (js_sys::Math::random() * u32::MAX as f64) as u64
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("2048 Nexus starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let mut session = Session::new(LocalStorage::open(), random_seed());
        let resumed = session.load_game(random_seed());
        let game = Rc::new(RefCell::new(Game {
            session,
            swipe: SwipeTracker::new(),
        }));

        {
            let mut g = game.borrow_mut();
            let update = resumed.unwrap_or_else(|| Update {
                board: Some(BoardView::still(&g.session.state)),
                ..Default::default()
            });
            g.present(update);
            g.draw_records(&document);
        }

        setup_keyboard(&document, game.clone());
        setup_swipes(&document, game.clone());
        setup_buttons(&document, game.clone());
        setup_timer(&window, game.clone());
        setup_visibility(&document, game);

        log::info!("2048 Nexus running!");
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let modifier = event.ctrl_key() || event.meta_key();
            if let Some(action) = decode_key(&event.key(), modifier) {
                event.prevent_default();
                game.borrow_mut().input(action);
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_swipes(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(board) = document.get_element_by_id("board") else {
            log::warn!("No #board element - swipes disabled");
            return;
        };

        // Touch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .swipe
                        .begin(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = board.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let Some(touch) = event.changed_touches().get(0) else {
                    return;
                };
                let mut g = game.borrow_mut();
                if let Some(dir) = g.swipe.end(touch.client_x() as f32, touch.client_y() as f32) {
                    event.prevent_default();
                    g.input(InputAction::Move(dir));
                }
            });
            let _ = board.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            // Interrupted gestures (scroll takeover, alert) never count as swipes
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().swipe.cancel();
            });
            let _ = board.add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .swipe
                    .begin(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = board.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if let Some(dir) = g.swipe.end(event.client_x() as f32, event.client_y() as f32) {
                    g.input(InputAction::Move(dir));
                }
            });
            // On the document so a drag released outside the board still counts
            let _ = document.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// One delegated click handler for buttons and option chips
    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(button)) = target.closest("button") else {
                return;
            };
            let data = button
                .get_attribute("data-size")
                .or_else(|| button.get_attribute("data-mode"));
            let id = if data.is_some() {
                button.parent_element().map(|p| p.id()).unwrap_or_default()
            } else {
                button.id()
            };

            if let Some(action) = decode_button(&id, data.as_deref()) {
                game.borrow_mut().input(action);
            }
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Whole-second countdown driver
    fn setup_timer(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut g = game.borrow_mut();
            if g.session.state.countdown.is_none() {
                return;
            }
            let update = g.session.tick(1_000);
            g.present(update);
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1_000,
        );
        closure.forget();
    }

    /// Pause the countdown and save while the tab is hidden
    fn setup_visibility(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let visible = document_clone.visibility_state() == web_sys::VisibilityState::Visible;
            let mut g = game.borrow_mut();
            if !visible && g.session.state.status == GameStatus::Active {
                g.session.save_game();
            }
            let update = g.session.set_visible(visible);
            g.present(update);
        });
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            closure.as_ref().unchecked_ref(),
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Pick the move that merges the most value, preferring any move that changes the grid
#[cfg(not(target_arch = "wasm32"))]
fn greedy_direction(grid: &nexus_2048::sim::Grid) -> Option<nexus_2048::sim::Direction> {
    use nexus_2048::sim::{Direction, resolve};

    Direction::ALL
        .into_iter()
        .map(|dir| (dir, resolve(grid, dir)))
        .filter(|(_, res)| res.changed)
        .max_by_key(|(_, res)| res.merged_value())
        .map(|(dir, _)| dir)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use nexus_2048::persistence::MemoryStorage;
    use nexus_2048::platform::InputAction;
    use nexus_2048::sim::GameStatus;
    use nexus_2048::{Session, consts::WIN_TILE};

    env_logger::init();
    log::info!("2048 Nexus (native) starting...");
    log::info!("Native mode plays one headless game - use the wasm build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(nexus_2048::platform::now_ms);
    let mut session = Session::new(MemoryStorage::new(), seed);

    // Merges 400ms apart keep combos alive
    let mut now = 0u64;
    while let Some(dir) = greedy_direction(&session.state.grid) {
        now += 400;
        let update = session.input(InputAction::Move(dir), now);
        for achievement in &update.unlocked {
            println!("Unlocked: {}", achievement.name());
        }
        session.settle();

        match session.state.status {
            GameStatus::Won => {
                println!("Reached {} after {} moves", WIN_TILE, session.state.score.moves);
                session.input(InputAction::Continue, now);
            }
            GameStatus::Lost => break,
            GameStatus::Active => {}
        }
    }

    let state = &session.state;
    println!("Seed:         {}", seed);
    println!("Score:        {}", state.score.score);
    println!("Moves:        {}", state.score.moves);
    println!("Highest tile: {}", state.score.highest_tile);
    println!("Best combo:   ×{}", state.score.best_combo);
    if let Some(top) = session.leaderboard.top_score() {
        println!("Leaderboard:  {}", top);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
