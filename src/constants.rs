//! Host-side constants for the web front-end.
//!
//! Simulation and shading tuning lives in `ripple_core::constants`; these
//! only describe the DOM surface the effect is attached to.

// HTMLMediaElement.readyState once the current frame is decoded
pub const HAVE_CURRENT_DATA: u16 = 2;

// URL schemes whose media is always readable by the page
pub const SAME_ORIGIN_SCHEMES: [&str; 2] = ["blob:", "data:"];

// Event that fires when the first video frame becomes available
pub const VIDEO_READY_EVENT: &str = "loadeddata";

// Pointer and resize events the effect listens for
pub const POINTER_MOVE_EVENT: &str = "pointermove";
pub const POINTER_LEAVE_EVENT: &str = "pointerleave";
pub const RESIZE_EVENT: &str = "resize";

// Largest frame delta fed to the caustics clock
pub const MAX_FRAME_DT_SEC: f32 = 0.1;
