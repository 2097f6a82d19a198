//! Browser glue: DOM listeners and the requestAnimationFrame loop

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent};

use super::EventBinding;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::input::InputState;
use crate::renderer::Renderer;
use crate::sim::Engine;

/// One registered DOM listener
struct DomListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl DomListener {
    fn bind(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) -> Self {
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        log::debug!("Bound {} listener", event);
        Self {
            target: target.clone(),
            event,
            closure,
        }
    }

    fn release(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref());
        log::debug!("Unbound {} listener", self.event);
    }
}

/// Listeners owned by the engine until cleanup
pub struct DomBinding {
    listeners: Vec<DomListener>,
}

impl DomBinding {
    /// Key state goes straight into the shared input. Bound keys suppress
    /// the browser default (page scrolling on arrows and space).
    pub fn keyboard(window: &web_sys::Window, input: Rc<RefCell<InputState>>) -> Self {
        let down_input = Rc::clone(&input);
        let down = DomListener::bind(window, "keydown", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                if down_input.borrow_mut().key_down(&key.code()) {
                    event.prevent_default();
                }
            }
        });
        let up = DomListener::bind(window, "keyup", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                input.borrow_mut().key_up(&key.code());
            }
        });

        Self {
            listeners: vec![down, up],
        }
    }

    /// Clicks on the canvas activate bonus blocks under the pointer
    pub fn pointer<R: Renderer + 'static>(
        canvas: &HtmlCanvasElement,
        engine: Weak<RefCell<Engine<R>>>,
    ) -> Self {
        let element = canvas.clone();
        let click = DomListener::bind(canvas, "mousedown", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(engine) = engine.upgrade() else {
                return;
            };
            let (x, y) = to_canvas(&element, mouse.client_x() as f32, mouse.client_y() as f32);
            if let Ok(mut engine) = engine.try_borrow_mut() {
                if engine.activate_block_at(x, y) {
                    log::debug!("Bonus block clicked at ({:.0}, {:.0})", x, y);
                }
            }
        });

        Self {
            listeners: vec![click],
        }
    }
}

impl EventBinding for DomBinding {
    fn unbind(&mut self) {
        for listener in self.listeners.drain(..) {
            listener.release();
        }
    }
}

/// Client pixel position to logical canvas coordinates
fn to_canvas(canvas: &HtmlCanvasElement, client_x: f32, client_y: f32) -> (f32, f32) {
    let bounds = canvas.get_bounding_client_rect();
    let w = bounds.width().max(1.0) as f32;
    let h = bounds.height().max(1.0) as f32;
    (
        (client_x - bounds.left() as f32) * CANVAS_WIDTH / w,
        (client_y - bounds.top() as f32) * CANVAS_HEIGHT / h,
    )
}

/// Drive the engine from requestAnimationFrame until the run ends
///
/// The loop belongs to the current run: once the engine is stopped or
/// restarted, the pending callback finds a newer run id and exits.
pub fn start_frame_loop<R: Renderer + 'static>(engine: Rc<RefCell<Engine<R>>>) {
    let run_id = engine.borrow().run_id();
    request_animation_frame(engine, run_id);
}

fn request_animation_frame<R: Renderer + 'static>(engine: Rc<RefCell<Engine<R>>>, run_id: u64) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        frame_loop(engine, run_id, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn frame_loop<R: Renderer + 'static>(engine: Rc<RefCell<Engine<R>>>, run_id: u64, time: f64) {
    let more = {
        let mut e = engine.borrow_mut();
        e.run_id() == run_id && e.frame(time)
    };
    if more {
        request_animation_frame(engine, run_id);
    }
}
