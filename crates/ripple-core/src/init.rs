//! Small one-shot primitives used by the hosts.
//!
//! [`InitOnce`] is an owned "ensure initialised" gate: hold one wherever the
//! setup belongs and call [`InitOnce::ensure`] from every entry point.
//! [`ReadySignal`] is a completion signal fired exactly once when a dependency
//! (a video with decoded data, say) becomes usable; dependents subscribe
//! instead of re-checking on a timer.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

#[derive(Debug)]
pub struct InitOnce {
    once: Once,
}

impl Default for InitOnce {
    fn default() -> Self {
        Self::new()
    }
}

impl InitOnce {
    pub const fn new() -> Self {
        Self { once: Once::new() }
    }

    /// Run `init` unless it already ran. Returns whether it ran on this call.
    pub fn ensure(&self, init: impl FnOnce()) -> bool {
        let mut ran = false;
        self.once.call_once(|| {
            init();
            ran = true;
        });
        ran
    }

    pub fn is_done(&self) -> bool {
        self.once.is_completed()
    }
}

type Callback = Box<dyn FnOnce()>;

enum SignalState {
    Pending(Vec<Callback>),
    Fired,
}

/// Single-threaded, fire-once readiness signal. Clones share state.
#[derive(Clone)]
pub struct ReadySignal {
    state: Rc<RefCell<SignalState>>,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReadySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadySignal")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl ReadySignal {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SignalState::Pending(Vec::new()))),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), SignalState::Fired)
    }

    /// Fire the signal. Only the first call runs subscribers; returns whether
    /// this call was that first one.
    pub fn fire(&self) -> bool {
        let pending = {
            let mut state = self.state.borrow_mut();
            match std::mem::replace(&mut *state, SignalState::Fired) {
                SignalState::Pending(callbacks) => callbacks,
                SignalState::Fired => return false,
            }
        };
        for callback in pending {
            callback();
        }
        true
    }

    /// Run `callback` once the signal fires, or right away if it already has.
    pub fn on_ready(&self, callback: impl FnOnce() + 'static) {
        {
            let mut state = self.state.borrow_mut();
            if let SignalState::Pending(callbacks) = &mut *state {
                callbacks.push(Box::new(callback));
                return;
            }
        }
        callback();
    }
}
