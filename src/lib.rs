#![cfg(target_arch = "wasm32")]
use instant::Instant;
use ripple_core::{EffectConfig, InitOnce, PointerState, RippleEffect};
use ripple_gpu::WgpuBackend;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys as web;

mod config;
mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod video;

pub(crate) type Effect = RippleEffect<WgpuBackend<video::VideoSurface>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// Entry point for the page. Create one and attach it to any number of
/// canvas/video pairs.
#[wasm_bindgen]
pub struct RippleRuntime {
    logging: InitOnce,
}

impl Default for RippleRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl RippleRuntime {
    #[wasm_bindgen(constructor)]
    pub fn new() -> RippleRuntime {
        let runtime = RippleRuntime {
            logging: InitOnce::new(),
        };
        runtime.ensure_logging();
        runtime
    }

    fn ensure_logging(&self) {
        self.logging.ensure(|| {
            console_log::init_with_level(log::Level::Info).ok();
            log::info!("[ripple] runtime ready");
        });
    }

    /// Layer the effect over `video`, drawing into `canvas`.
    ///
    /// `config` is `undefined`, a preset name or a partial config object.
    /// Resolves to a `RippleHandle`, or to `undefined` when the effect cannot
    /// run here; the canvas is then left hidden and the video stays undistorted.
    pub fn attach(
        &self,
        canvas: web::HtmlCanvasElement,
        video: web::HtmlVideoElement,
        config: JsValue,
    ) -> js_sys::Promise {
        self.ensure_logging();
        let config = config::resolve(&config);
        future_to_promise(async move {
            let attached = match config {
                Ok(config) => attach(canvas, video, config).await,
                Err(e) => Err(e),
            };
            Ok(match attached {
                Ok(handle) => JsValue::from(handle),
                Err(e) => {
                    log::warn!("[ripple] effect unavailable, video stays undistorted: {e:#}");
                    JsValue::UNDEFINED
                }
            })
        })
    }
}

async fn attach(
    canvas: web::HtmlCanvasElement,
    video: web::HtmlVideoElement,
    config: EffectConfig,
) -> anyhow::Result<RippleHandle> {
    dom::set_canvas_visible(&canvas, false);
    let size = dom::sync_canvas_backing_size(&canvas);
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let backend = WgpuBackend::new(&instance, surface, size, config.alpha_mode).await?;
    let effect = Rc::new(RefCell::new(RippleEffect::install(backend, config, size)?));

    let pointer = Rc::new(RefCell::new(PointerState::default()));
    let mut listeners = events::wire_listeners(&canvas, &pointer);
    let (surface_video, ready_listener) = video::VideoSurface::new(video);
    listeners.extend(ready_listener);
    let video = Rc::new(surface_video);

    // The loop only starts once there is a decoded frame to distort
    let frame_loop: Rc<RefCell<Option<frame::AnimationLoop>>> = Rc::new(RefCell::new(None));
    let slot = Rc::downgrade(&frame_loop);
    let weak_video = Rc::downgrade(&video);
    let (loop_effect, loop_canvas) = (effect.clone(), canvas.clone());
    video.ready().on_ready(move || {
        let (Some(slot), Some(video)) = (slot.upgrade(), weak_video.upgrade()) else {
            return;
        };
        let mut ctx = frame::FrameContext {
            effect: loop_effect,
            pointer,
            video,
            canvas: loop_canvas,
            last_instant: Instant::now(),
            shown: false,
        };
        *slot.borrow_mut() = Some(frame::AnimationLoop::start(move || ctx.frame()));
    });

    log::info!("[ripple] attached {}x{}", size.width, size.height);
    Ok(RippleHandle {
        inner: Some(Attached {
            frame_loop,
            listeners,
            effect,
            video,
            canvas,
        }),
    })
}

struct Attached {
    frame_loop: Rc<RefCell<Option<frame::AnimationLoop>>>,
    listeners: events::Listeners,
    effect: Rc<RefCell<Effect>>,
    video: Rc<video::VideoSurface>,
    canvas: web::HtmlCanvasElement,
}

/// One attached effect. `destroy()` (or `free()`) removes it again.
#[wasm_bindgen]
pub struct RippleHandle {
    inner: Option<Attached>,
}

#[wasm_bindgen]
impl RippleHandle {
    /// Re-measure the canvas and resize the simulation to match.
    pub fn resize(&self) {
        let Some(attached) = self.inner.as_ref() else {
            return;
        };
        let size = dom::sync_canvas_backing_size(&attached.canvas);
        if let Err(e) = attached.effect.borrow_mut().resize(size) {
            log::error!("[ripple] resize failed, effect removed: {e}");
            dom::set_canvas_visible(&attached.canvas, false);
        }
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|a| a.effect.borrow().is_running())
    }

    /// Stop the loop, remove every listener and release all GPU resources.
    /// Calling it again does nothing.
    pub fn destroy(&mut self) {
        let Some(Attached {
            frame_loop,
            listeners,
            effect,
            video,
            canvas,
        }) = self.inner.take()
        else {
            return;
        };
        if let Some(frame_loop) = frame_loop.borrow_mut().take() {
            frame_loop.stop();
        }
        drop(listeners);
        effect.borrow_mut().teardown();
        dom::set_canvas_visible(&canvas, false);
        drop(video);
        log::info!("[ripple] destroyed");
    }
}

impl Drop for RippleHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}
