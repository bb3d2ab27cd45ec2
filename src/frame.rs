use crate::constants::MAX_FRAME_DT_SEC;
use crate::dom;
use crate::video::VideoSurface;
use crate::Effect;
use instant::Instant;
use ripple_core::PointerState;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub effect: Rc<RefCell<Effect>>,
    pub pointer: Rc<RefCell<PointerState>>,
    pub video: Rc<VideoSurface>,
    pub canvas: web::HtmlCanvasElement,
    pub last_instant: Instant,
    pub shown: bool,
}

impl FrameContext {
    /// One display refresh. Returns whether the loop should keep running.
    pub fn frame(&mut self) -> bool {
        let now = Instant::now();
        let dt_sec = (now - self.last_instant).as_secs_f32().min(MAX_FRAME_DT_SEC);
        self.last_instant = now;

        let mut effect = self.effect.borrow_mut();
        if !effect.is_running() {
            dom::set_canvas_visible(&self.canvas, false);
            return false;
        }

        let size = dom::canvas_size(&self.canvas);
        if size != effect.surface_size() {
            if let Err(e) = effect.resize(size) {
                log::error!("[frame] resize failed, effect removed: {e}");
                dom::set_canvas_visible(&self.canvas, false);
                return false;
            }
        }

        let sample = self.pointer.borrow_mut().take_sample();
        if let Err(e) = effect.frame(dt_sec, sample, &self.video) {
            log::error!("[frame] frame failed, effect removed: {e}");
            effect.teardown();
            dom::set_canvas_visible(&self.canvas, false);
            return false;
        }
        // the canvas stays hidden until it holds a composited frame
        if !self.shown && effect.backend().frames_presented() > 0 {
            dom::set_canvas_visible(&self.canvas, true);
            self.shown = true;
        }
        true
    }
}

struct LoopState {
    handle: Cell<Option<i32>>,
    tick: RefCell<Option<Closure<dyn FnMut()>>>,
}

/// requestAnimationFrame driver. Stops when the callback returns `false`,
/// on [`AnimationLoop::stop`], or when dropped.
pub struct AnimationLoop {
    state: Rc<LoopState>,
}

impl AnimationLoop {
    pub fn start(mut on_frame: impl FnMut() -> bool + 'static) -> Self {
        let state = Rc::new(LoopState {
            handle: Cell::new(None),
            tick: RefCell::new(None),
        });
        let weak: Weak<LoopState> = Rc::downgrade(&state);
        *state.tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.handle.set(None);
            if on_frame() {
                schedule(&state);
            } else {
                log::info!("[frame] loop finished");
            }
        }) as Box<dyn FnMut()>));
        schedule(&state);
        Self { state }
    }

    pub fn stop(&self) {
        if let Some(id) = self.state.handle.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        self.state.tick.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule(state: &LoopState) {
    let tick = state.tick.borrow();
    let (Some(tick), Some(w)) = (tick.as_ref(), web::window()) else {
        return;
    };
    match w.request_animation_frame(tick.as_ref().unchecked_ref()) {
        Ok(id) => state.handle.set(Some(id)),
        Err(e) => log::error!("[frame] requestAnimationFrame failed: {:?}", e),
    }
}
