//! Kart Dash entry point
//!
//! In the browser this wires WebGPU, DOM listeners and the HUD to the engine.
//! Natively it plays a level headlessly with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use kart_dash::level::{self, LevelConfig, ProceduralSource};
    use kart_dash::platform::web::{DomBinding, start_frame_loop};
    use kart_dash::renderer::RenderState;
    use kart_dash::sim::{Engine, GamePhase};
    use kart_dash::{Action, BestScore, CarColor, EngineError, Settings};

    type SharedEngine = Rc<RefCell<Engine<RenderState>>>;

    thread_local! {
        static ENGINE: RefCell<Option<SharedEngine>> = const { RefCell::new(None) };
        static BEST: RefCell<BestScore> = RefCell::new(BestScore::new());
    }

    fn with_engine<T>(f: impl FnOnce(&SharedEngine) -> T) -> Option<T> {
        ENGINE.with(|slot| slot.borrow().as_ref().map(f))
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Kart Dash starting...");

        let best = BestScore::load();
        set_text("best", &best.value.to_string());
        BEST.with(|b| *b.borrow_mut() = best);

        match init().await {
            Ok(engine) => {
                ENGINE.with(|slot| *slot.borrow_mut() = Some(engine));
                log::info!("Kart Dash ready");
            }
            Err(e) => {
                log::error!("Cannot start renderer: {}", e);
                set_text("announcer", "WebGPU is not available in this browser.");
            }
        }
    }

    async fn init() -> Result<SharedEngine, EngineError> {
        let window = web_sys::window().ok_or_else(|| EngineError::Surface("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| EngineError::Surface("no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| EngineError::Surface("no <canvas id=\"canvas\">".into()))?;

        // Backing store follows the displayed size; the scene is in logical units
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| EngineError::Surface(e.to_string()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| EngineError::Adapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;

        let seed = js_sys::Date::now() as u64;
        let mut engine = Engine::new(render_state, Settings::default(), seed);
        engine.set_level(level::preset("classic_1_1").unwrap_or_else(level::fallback_level));
        engine.on_state_change(on_state_change);
        engine.on_score(on_score);
        engine.on_announce(|message| set_text("announcer", message));

        let keyboard = DomBinding::keyboard(&window, engine.input());
        engine.attach_binding(Box::new(keyboard));

        let engine = Rc::new(RefCell::new(engine));
        let pointer = DomBinding::pointer(&canvas, Rc::downgrade(&engine));
        engine.borrow_mut().attach_binding(Box::new(pointer));

        log::info!("Game initialized with seed: {}", seed);
        Ok(engine)
    }

    fn on_state_change(phase: GamePhase) {
        if let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        {
            let _ = body.set_attribute("data-phase", phase.label());
        }
    }

    fn on_score(score: u64) {
        set_text("score", &score.to_string());
        BEST.with(|best| {
            let mut best = best.borrow_mut();
            if best.record(score) {
                best.save();
                set_text("best", &score.to_string());
            }
        });
    }

    fn apply_level(level: LevelConfig) {
        with_engine(|engine| engine.borrow_mut().set_level(level));
    }

    #[wasm_bindgen]
    pub fn start_run() {
        with_engine(|engine| {
            engine.borrow_mut().start();
            start_frame_loop(Rc::clone(engine));
        });
    }

    #[wasm_bindgen]
    pub fn stop_run() {
        with_engine(|engine| engine.borrow_mut().stop());
    }

    /// Tear the engine down and release its listeners
    #[wasm_bindgen]
    pub fn shutdown() {
        if let Some(engine) = ENGINE.with(|slot| slot.borrow_mut().take()) {
            engine.borrow_mut().cleanup();
            log::info!("Engine shut down");
        }
    }

    /// Select a built-in level. Returns false for unknown ids.
    #[wasm_bindgen]
    pub fn select_level(id: &str) -> bool {
        match level::preset(id) {
            Some(level) => {
                apply_level(level);
                true
            }
            None => {
                log::warn!("Unknown preset '{}'", id);
                false
            }
        }
    }

    /// Load a level descriptor received from a remote generator
    #[wasm_bindgen]
    pub fn load_level_json(json: &str) -> bool {
        match level::parse_level(json) {
            Ok(level) => {
                apply_level(level);
                true
            }
            Err(e) => {
                log::warn!("Rejected level descriptor: {}", e);
                false
            }
        }
    }

    /// Build a level from a text prompt. Returns the level name.
    #[wasm_bindgen]
    pub fn generate_level(prompt: &str) -> String {
        let level = level::generate_level(&ProceduralSource, prompt);
        let name = level.name.clone();
        apply_level(level);
        name
    }

    #[wasm_bindgen]
    pub fn set_car_color(name: &str) -> bool {
        match CarColor::from_name(name) {
            Some(color) => {
                with_engine(|engine| engine.borrow_mut().set_car_color(color));
                true
            }
            None => false,
        }
    }

    /// On-screen control buttons
    #[wasm_bindgen]
    pub fn set_touch_action(action: &str, active: bool) {
        if let Some(action) = Action::from_label(action) {
            with_engine(|engine| engine.borrow_mut().set_virtual_action(action, active));
        }
    }

    #[wasm_bindgen]
    pub fn remap_action(action: &str, key: &str) {
        if let Some(action) = Action::from_label(action) {
            with_engine(|engine| engine.borrow_mut().remap(action, key));
        }
    }

    #[wasm_bindgen]
    pub fn best_score() -> f64 {
        BEST.with(|best| best.borrow().value as f64)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use kart_dash::level::{self, ProceduralSource};
    use kart_dash::renderer::NullRenderer;
    use kart_dash::sim::Engine;
    use kart_dash::{Action, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Kart Dash (native) starting...");
    log::info!("Native mode runs headless - run with `trunk serve` for the web version");

    // Any arguments form a prompt for the offline level generator
    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let level = if prompt.is_empty() {
        level::fallback_level()
    } else {
        level::generate_level(&ProceduralSource, &prompt)
    };
    println!("Level: {} ({}, {})", level.name, level.difficulty.as_str(), level.theme.as_str());

    let mut engine = Engine::new(NullRenderer, Settings::default(), 7);
    engine.set_level(level);
    engine.on_state_change(|phase| log::info!("Phase -> {:?}", phase));
    engine.on_announce(|message| println!("[announce] {message}"));
    engine.start();

    const MAX_FRAMES: u32 = 60 * 60 * 3;
    let mut frames = 0;
    while frames < MAX_FRAMES {
        let (jump, shoot) = autopilot(engine.world());
        engine.set_virtual_action(Action::Jump, jump);
        engine.set_virtual_action(Action::Shoot, shoot);

        let now_ms = frames as f64 * 1000.0 / 60.0;
        frames += 1;
        if !engine.frame(now_ms) {
            break;
        }
    }

    let world = engine.world();
    println!(
        "Finished after {} frames: {:?}, score {}, distance {:.0}, boss hp {}/{}",
        frames,
        engine.phase(),
        engine.score(),
        world.distance,
        world.boss.hp,
        world.boss.max_hp
    );
}

/// Jump when something dangerous or solid is close ahead, shoot when armed
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(world: &kart_dash::sim::World) -> (bool, bool) {
    use kart_dash::sim::Contact;

    let player = &world.player.rect;
    let ahead = |contact: Contact| {
        world.obstacles.iter().any(|o| {
            let gap = o.rect.x - player.right();
            !o.passed && o.kind.contact() == contact && (0.0..120.0).contains(&gap)
        })
    };

    let jump = ahead(Contact::Lethal) || ahead(Contact::Solid);
    let shoot = world.player.has_fire_power;
    (jump, shoot)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
