use crate::constants::{POINTER_LEAVE_EVENT, POINTER_MOVE_EVENT, RESIZE_EVENT};
use crate::dom;
use crate::input;
use ripple_core::PointerState;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// A DOM event listener that is removed again when dropped.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new<E>(target: &web::EventTarget, kind: &'static str, mut handler: impl FnMut(E) + 'static) -> Self
    where
        E: JsCast + 'static,
    {
        let callback = Closure::wrap(Box::new(move |ev: web::Event| {
            if let Ok(ev) = ev.dyn_into::<E>() {
                handler(ev);
            }
        }) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref()) {
            log::warn!("[events] could not listen for {kind}: {:?}", e);
        }
        Self {
            target: target.clone(),
            kind,
            callback,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

pub type Listeners = SmallVec<[Listener; 4]>;

/// Pointer tracking and canvas resize listeners for one attached effect.
pub fn wire_listeners(canvas: &web::HtmlCanvasElement, pointer: &Rc<RefCell<PointerState>>) -> Listeners {
    let mut listeners = Listeners::new();
    let Some(window) = web::window() else {
        return listeners;
    };

    // Listen on the window so motion over content stacked above the canvas still counts
    let canvas_move = canvas.clone();
    let pointer_move = pointer.clone();
    listeners.push(Listener::new(&window, POINTER_MOVE_EVENT, move |ev: web::PointerEvent| {
        let mut pointer = pointer_move.borrow_mut();
        match input::pointer_uv(&ev, &canvas_move) {
            Some(uv) => pointer.record(uv),
            // moving over the page outside the canvas ends the stroke
            None => pointer.leave(),
        }
    }));

    if let Some(document) = dom::window_document() {
        let pointer_leave = pointer.clone();
        listeners.push(Listener::new(&document, POINTER_LEAVE_EVENT, move |_: web::PointerEvent| {
            pointer_leave.borrow_mut().leave();
        }));
    }

    let canvas_resize = canvas.clone();
    listeners.push(Listener::new(&window, RESIZE_EVENT, move |_: web::Event| {
        dom::sync_canvas_backing_size(&canvas_resize);
    }));

    listeners
}
