//! Cyber Breaker entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

    use cyber_breaker::platform::{KeyListeners, WebScheduler};
    use cyber_breaker::renderer::{RenderState, ShapeBatch};
    use cyber_breaker::sim::{Action, Game, GamePhase, Overlay, StageTable};
    use cyber_breaker::{Session, Settings};

    /// Event dispatched on `window` when the final stage is cleared
    const UNLOCK_EVENT: &str = "allstagescleared";

    /// Overlay buttons and the action each one performs
    const BUTTONS: [(&str, Action); 4] = [
        ("start-btn", Action::Start),
        ("retry-btn", Action::Retry),
        ("next-btn", Action::NextStage),
        ("restart-btn", Action::Restart),
    ];

    /// Everything the page keeps alive
    struct App {
        session: Session<WebScheduler>,
        render_state: Option<RenderState>,
        batch: ShapeBatch,
        keys: Option<KeyListeners>,
        last_phase: Option<GamePhase>,
    }

    impl App {
        /// One animation frame: draw and step the game, then present it
        fn on_frame(&mut self) {
            // The browser never runs a cancelled request, so the pending
            // handle is the one that fired
            let Some(handle) = self.session.frames().pending() else {
                return;
            };
            self.batch.reset();
            self.session.frame(handle, &mut self.batch);
            self.render();
            self.update_hud();
        }

        fn apply(&mut self, action: Action) {
            match self.session.apply(action) {
                Ok(()) => log::info!("{:?} -> {:?}", action, self.session.game().phase()),
                Err(e) => log::warn!("{}", e),
            }
            self.update_hud();
        }

        /// Render the current batch
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.batch) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Draw the still frame shown behind an overlay
        fn render_idle(&mut self) {
            self.batch.reset();
            self.session.draw_idle(&mut self.batch);
            self.render();
        }

        /// Update HUD and overlay elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let game = self.session.game();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&game.score().to_string()));
            }
            if let Some(el) = document.query_selector("#hud-stage .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{} / {}", game.stage(), game.stage_count())));
            }

            // Overlay only changes with the phase
            let phase = game.phase();
            if self.last_phase == Some(phase) {
                return;
            }
            self.last_phase = Some(phase);
            show_overlay(&document, game.overlay());
        }

        fn teardown(&mut self) {
            self.session.teardown();
            self.keys = None;
        }

        /// Page restored from the back/forward cache
        fn resume(&mut self) {
            if !self.session.resume() {
                self.render_idle();
            }
            self.update_hud();
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    fn show_overlay(document: &Document, overlay: Option<Overlay>) {
        let Some(overlay) = overlay else {
            set_hidden(document, "overlay", true);
            return;
        };

        set_hidden(document, "overlay", false);
        if let Some(el) = document.get_element_by_id("overlay-title") {
            el.set_text_content(Some(&overlay.title()));
        }
        if let Some(el) = document.get_element_by_id("overlay-message") {
            el.set_text_content(Some(&overlay.message()));
        }
        for (id, action) in BUTTONS {
            let visible = overlay.action() == action;
            set_hidden(document, id, !visible);
            if visible {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(overlay.button_label()));
                }
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Cyber Breaker starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        // Set canvas size
        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let mut game = Game::new(StageTable::builtin(), seed);
        game.on_all_stages_cleared(|| {
            log::info!("All stages cleared, unlocking hidden content");
            let dispatched = web_sys::Event::new(UNLOCK_EVENT)
                .and_then(|event| match web_sys::window() {
                    Some(w) => w.dispatch_event(&event),
                    None => Ok(false),
                });
            if let Err(e) = dispatched {
                log::warn!("Failed to dispatch {}: {:?}", UNLOCK_EVENT, e);
            }
        });

        let scheduler = WebScheduler::new();
        let app = Rc::new(RefCell::new(App {
            session: Session::new(game, scheduler.clone(), settings, seed),
            render_state: None,
            batch: ShapeBatch::new(),
            keys: None,
            last_phase: None,
        }));
        {
            let app = app.clone();
            scheduler.set_callback(move |_time: f64| app.borrow_mut().on_frame());
        }

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        app.borrow_mut().render_state = Some(render_state);

        setup_key_listeners(app.clone())?;
        setup_buttons(&document, app.clone());
        setup_window_events(&window, &canvas, app.clone())?;

        {
            let mut a = app.borrow_mut();
            a.update_hud();
            a.render_idle();
        }
        set_hidden(&document, "hud", false);

        log::info!("Cyber Breaker running!");
        Ok(())
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let w = (canvas.client_width() as f64 * dpr) as u32;
        let h = (canvas.client_height() as f64 * dpr) as u32;
        (w.max(1), h.max(1))
    }

    fn setup_key_listeners(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let on_down = {
            let app = app.clone();
            move |event: KeyboardEvent| {
                let key = event.key();
                let mut a = app.borrow_mut();
                if key == "i" || key == "I" {
                    a.session.toggle_autopilot();
                } else if key == "Enter" {
                    // Keyboard shortcut for the overlay button
                    if let Some(overlay) = a.session.game().overlay() {
                        event.prevent_default();
                        a.apply(overlay.action());
                    }
                } else if a.session.settings_hotkey(&key) {
                    if !a.session.game().is_playing() {
                        a.render_idle();
                    }
                } else if a.session.key_down(&key) {
                    // Keep arrow keys from scrolling the page
                    event.prevent_default();
                }
            }
        };
        let on_up = {
            let app = app.clone();
            move |event: KeyboardEvent| {
                app.borrow_mut().session.key_up(&event.key());
            }
        };

        let listeners = KeyListeners::attach(on_down, on_up)?;
        app.borrow_mut().keys = Some(listeners);
        Ok(())
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for (id, action) in BUTTONS {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing button #{}", id);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().apply(action);
            });
            if let Err(e) =
                btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to attach #{}: {:?}", id, e);
            }
            closure.forget();
        }
    }

    fn setup_window_events(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        // Resize
        {
            let app = app.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let (w, h) = canvas_pixel_size(&window, &canvas);
                canvas.set_width(w);
                canvas.set_height(h);
                let mut a = app.borrow_mut();
                if let Some(ref mut render_state) = a.render_state {
                    render_state.resize(w, h);
                }
                if !a.session.game().is_playing() {
                    a.render_idle();
                }
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Scroll position drives backdrop parallax
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let scroll_y = window.scroll_y().unwrap_or(0.0);
                let viewport = window
                    .inner_height()
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                let page = window
                    .document()
                    .and_then(|d| d.document_element())
                    .map(|el| el.scroll_height() as f64)
                    .unwrap_or(0.0);
                let max = page - viewport;
                if max > 0.0 {
                    app.borrow_mut()
                        .session
                        .set_scroll_progress((scroll_y / max) as f32);
                }
            });
            window.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Unmount: stop the loop and remove key listeners
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().teardown();
            });
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Remount after a back/forward cache restore
        {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
                    if !event.persisted() {
                        return;
                    }
                    if let Err(e) = setup_key_listeners(app.clone()) {
                        log::error!("Failed to reattach key listeners: {:?}", e);
                    }
                    app.borrow_mut().resume();
                });
            window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cyber_breaker::platform::ManualScheduler;
    use cyber_breaker::renderer::ShapeBatch;
    use cyber_breaker::sim::{Action, Game, StageTable};
    use cyber_breaker::{QualityPreset, Session, Settings};

    env_logger::init();

    // cyber-breaker [seed] [max_frames] [low|medium|high]
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let max_frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(20_000);
    let settings = args
        .next()
        .and_then(|s| QualityPreset::from_str(&s))
        .map(Settings::from_preset)
        .unwrap_or_else(Settings::load);
    log::info!("Quality: {}", settings.quality.as_str());

    log::info!("Cyber Breaker (native) starting with seed {}", seed);
    log::info!("Native mode runs a headless autopilot game - run with `trunk serve` for web version");

    let mut game = Game::new(StageTable::builtin(), seed);
    game.on_all_stages_cleared(|| log::info!("All stages cleared, hidden content unlocked"));

    let mut session = Session::new(game, ManualScheduler::new(), settings, seed);
    session.set_autopilot(true);
    let mut batch = ShapeBatch::new();

    if let Err(e) = session.apply(Action::Start) {
        log::error!("{}", e);
        return;
    }

    let mut frames = 0u64;
    let mut triangles = 0usize;
    while frames < max_frames {
        let Some(handle) = session.frames_mut().scheduler_mut().fire() else {
            // Loop stopped: press the overlay button unless the run is complete
            let game = session.game();
            match game.overlay() {
                Some(overlay) if !game.is_complete() => {
                    log::info!("{} - {}", overlay.title(), overlay.message());
                    if let Err(e) = session.apply(overlay.action()) {
                        log::error!("{}", e);
                        break;
                    }
                    continue;
                }
                _ => break,
            }
        };
        batch.reset();
        session.frame(handle, &mut batch);
        triangles = triangles.max(batch.triangle_count());
        frames += 1;
    }

    let game = session.game();
    println!(
        "seed {}: {} frames, stage {}/{}, score {}, phase {:?}, peak {} triangles/frame",
        seed,
        frames,
        game.stage(),
        game.stage_count(),
        game.score(),
        game.phase(),
        triangles
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
