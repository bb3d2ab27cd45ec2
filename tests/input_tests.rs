// Host-side tests for pointer handling.
// The main crate is wasm-only, so these cover the pure pointer math it delegates to.

use glam::Vec2;
use ripple_core::{normalize_in_rect, PointerState, POINTER_SPEED_MAX};

#[test]
fn normalize_maps_rect_corners() {
    let origin = Vec2::new(100.0, 50.0);
    let size = Vec2::new(200.0, 100.0);
    assert_eq!(normalize_in_rect(origin, origin, size), Some(Vec2::ZERO));
    assert_eq!(normalize_in_rect(origin + size, origin, size), Some(Vec2::ONE));
    assert_eq!(
        normalize_in_rect(Vec2::new(150.0, 75.0), origin, size),
        Some(Vec2::new(0.25, 0.25))
    );
}

#[test]
fn normalize_rejects_outside_points() {
    let origin = Vec2::ZERO;
    let size = Vec2::new(10.0, 10.0);
    assert_eq!(normalize_in_rect(Vec2::new(-0.5, 5.0), origin, size), None);
    assert_eq!(normalize_in_rect(Vec2::new(5.0, 10.5), origin, size), None);
}

#[test]
fn normalize_rejects_degenerate_rects() {
    assert_eq!(normalize_in_rect(Vec2::ZERO, Vec2::ZERO, Vec2::new(0.0, 10.0)), None);
    assert_eq!(normalize_in_rect(Vec2::ZERO, Vec2::ZERO, Vec2::new(10.0, -1.0)), None);
    assert_eq!(normalize_in_rect(Vec2::ZERO, Vec2::ZERO, Vec2::new(f32::NAN, 1.0)), None);
}

#[test]
fn no_pointer_yet_means_no_motion() {
    let mut state = PointerState::default();
    assert_eq!(state.position(), None);
    let sample = state.take_sample();
    assert_eq!(sample.velocity, Vec2::ZERO);
}

#[test]
fn first_sample_after_entering_is_still() {
    let mut state = PointerState::default();
    state.record(Vec2::new(0.3, 0.4));
    let sample = state.take_sample();
    assert_eq!(sample.position, Vec2::new(0.3, 0.4));
    assert_eq!(sample.speed(), 0.0);
}

#[test]
fn velocity_is_motion_since_last_sample() {
    let mut state = PointerState::default();
    state.record(Vec2::new(0.2, 0.2));
    state.take_sample();
    // several events between two frames collapse into one displacement
    state.record(Vec2::new(0.25, 0.2));
    state.record(Vec2::new(0.3, 0.25));
    let sample = state.take_sample();
    assert!((sample.velocity - Vec2::new(0.1, 0.05)).length() < 1e-6);

    // pointer held still: next step injects nothing
    assert_eq!(state.take_sample().velocity, Vec2::ZERO);
}

#[test]
fn fast_jumps_are_clamped() {
    let mut state = PointerState::default();
    state.record(Vec2::ZERO);
    state.take_sample();
    state.record(Vec2::ONE);
    let sample = state.take_sample();
    assert!(sample.speed() <= POINTER_SPEED_MAX + 1e-6);
    assert!(sample.velocity.x > 0.0 && sample.velocity.y > 0.0);
}

#[test]
fn leaving_drops_pending_motion() {
    let mut state = PointerState::default();
    state.record(Vec2::new(0.5, 0.5));
    state.take_sample();
    state.record(Vec2::new(0.6, 0.5));
    state.leave();
    assert_eq!(state.take_sample().velocity, Vec2::ZERO);
    assert_eq!(state.position(), None);
}

#[test]
fn reentering_elsewhere_starts_a_still_stroke() {
    let mut state = PointerState::default();
    state.record(Vec2::new(0.95, 0.5));
    state.take_sample();
    state.leave();
    state.take_sample();

    state.record(Vec2::new(0.05, 0.5));
    let sample = state.take_sample();
    assert_eq!(sample.position, Vec2::new(0.05, 0.5));
    assert_eq!(sample.speed(), 0.0);

    // motion after re-entry counts again
    state.record(Vec2::new(0.1, 0.5));
    assert!((state.take_sample().speed() - 0.05).abs() < 1e-6);
}

#[test]
fn reentering_before_the_next_step_injects_nothing() {
    let mut state = PointerState::default();
    state.record(Vec2::new(0.9, 0.9));
    state.take_sample();
    state.leave();
    state.record(Vec2::new(0.1, 0.1));
    assert_eq!(state.take_sample().velocity, Vec2::ZERO);
}

#[test]
fn recorded_positions_are_clamped_to_the_surface() {
    let mut state = PointerState::default();
    state.record(Vec2::new(1.4, -0.2));
    assert_eq!(state.position(), Some(Vec2::new(1.0, 0.0)));
}
