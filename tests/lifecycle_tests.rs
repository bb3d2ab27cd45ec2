// Host-side tests for the effect lifecycle.
// The main crate is wasm-only, so these run RippleEffect on the instrumented
// software backend and check its call and handle ledger.

use glam::Vec2;
use ripple_core::{
    BackendError, Call, CpuBackend, EffectConfig, EffectError, GridSize, PointerSample,
    RippleEffect, VideoFeed, VideoFrame,
};

const SURFACE: GridSize = GridSize {
    width: 64,
    height: 48,
};

fn ready_video(size: GridSize) -> VideoFeed {
    VideoFeed::Ready(VideoFrame::from_fn(size, |x, y| {
        [x as f32 / size.width as f32, y as f32 / size.height as f32, 0.5, 1.0]
    }))
}

fn still() -> PointerSample {
    PointerSample::at_rest(Vec2::splat(0.5))
}

fn physics_calls(backend: &CpuBackend) -> Vec<(u32, u32)> {
    backend
        .calls()
        .iter()
        .filter_map(|c| match *c {
            Call::Physics { read, write } => Some((read, write)),
            _ => None,
        })
        .collect()
}

#[test]
fn each_frame_swaps_the_pair_exactly_once() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for _ in 0..9 {
        effect.frame(1.0 / 60.0, still(), &video).unwrap();
    }
    assert_eq!(effect.swaps(), 9);
    assert_eq!(effect.stats().steps, 9);
    drop(effect);

    assert_eq!(backend.aliasing_violations(), 0);
    let steps = physics_calls(&backend);
    assert_eq!(steps.len(), 9);
    for (read, write) in &steps {
        assert_ne!(read, write);
    }
    for pair in steps.windows(2) {
        // what one step wrote, the next one reads
        assert_eq!(pair[0].1, pair[1].0);
        assert_eq!(pair[0].0, pair[1].1);
    }
}

#[test]
fn composite_reads_what_physics_just_wrote() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for _ in 0..4 {
        effect.frame(0.016, still(), &video).unwrap();
    }
    drop(effect);

    let mut last_write = None;
    for call in backend.calls() {
        match *call {
            Call::Physics { write, .. } => last_write = Some(write),
            Call::Composite { state, .. } => assert_eq!(Some(state), last_write),
            Call::Upload { .. } => {}
        }
    }
}

#[test]
fn pointer_motion_reaches_the_simulation() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    let moving = PointerSample {
        position: Vec2::new(0.4, 0.6),
        velocity: Vec2::new(0.03, -0.02),
    };
    effect.frame(0.016, moving, &video).unwrap();
    assert!(effect.backend().last_step_report().injected > 0.0);
    effect.frame(0.016, still(), &video).unwrap();
    assert_eq!(effect.backend().last_step_report().injected, 0.0);
    let state = effect.backend().latest_state().unwrap();
    assert!(state.max_abs_height() > 0.0);
}

#[test]
fn resize_releases_the_old_pair_before_allocating() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    effect.frame(0.016, still(), &video).unwrap();
    let (old_a, old_b) = physics_calls(effect.backend())[0];
    let live_before = effect.backend().live_handles();

    let bigger = GridSize::new(128, 96);
    effect.resize(bigger).unwrap();
    assert_eq!(effect.surface_size(), bigger);
    assert_eq!(effect.grid_size(), GridSize::new(64, 48));
    assert_eq!(effect.backend().surface(), bigger);
    assert_eq!(effect.backend().live_handles(), live_before);
    assert!(!effect.backend().is_live(old_a));
    assert!(!effect.backend().is_live(old_b));
    assert!(effect.backend().released().contains(&old_a));
    assert!(effect.backend().released().contains(&old_b));

    effect.frame(0.016, still(), &video).unwrap();
    let (new_read, new_write) = *physics_calls(effect.backend()).last().unwrap();
    assert!(![old_a, old_b].contains(&new_read));
    assert!(![old_a, old_b].contains(&new_write));
    assert_eq!(effect.backend().output().size(), bigger);
    assert_eq!(effect.stats().resizes, 1);
}

#[test]
fn resize_to_the_same_size_does_nothing() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    effect.resize(SURFACE).unwrap();
    assert_eq!(effect.stats().resizes, 0);
    assert!(effect.backend().released().is_empty());
}

#[test]
fn resize_after_many_frames_starts_from_flat_water() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    let moving = PointerSample {
        position: Vec2::new(0.5, 0.5),
        velocity: Vec2::new(0.05, 0.0),
    };
    for _ in 0..5 {
        effect.frame(0.016, moving, &video).unwrap();
    }
    effect.resize(GridSize::new(80, 60)).unwrap();
    effect.frame(0.016, still(), &video).unwrap();
    let state = effect.backend().latest_state().unwrap();
    assert_eq!(state.max_abs_height(), 0.0);
}

#[test]
fn teardown_releases_everything_and_stops_drawing() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    // two targets, one video texture, one program set
    assert_eq!(effect.backend().live_handles(), 4);
    effect.frame(0.016, still(), &video).unwrap();
    effect.teardown();
    assert!(!effect.is_running());
    assert_eq!(effect.backend().live_handles(), 0);

    let draws = effect.backend().draw_calls();
    for _ in 0..3 {
        effect.frame(0.016, still(), &video).unwrap();
    }
    effect.resize(GridSize::new(10, 10)).unwrap();
    effect.teardown();
    assert_eq!(effect.backend().draw_calls(), draws);
    assert_eq!(effect.backend().released().len(), 4);
}

#[test]
fn dropping_the_effect_tears_it_down() {
    let mut backend = CpuBackend::new(SURFACE);
    {
        let _effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    }
    assert_eq!(backend.live_handles(), 0);
    assert_eq!(backend.released().len(), 4);
}

#[test]
fn missing_float_targets_fail_soft() {
    let mut backend = CpuBackend::new(SURFACE).without_float_targets();
    let err = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE)
        .err()
        .unwrap();
    assert!(matches!(err, EffectError::Backend(BackendError::Unsupported(_))));
    assert_eq!(backend.live_handles(), 0);
    assert_eq!(backend.draw_calls(), 0);
    assert_eq!(backend.surface_configurations(), 0);
}

#[test]
fn surface_is_configured_only_once_everything_is_allocated() {
    let mut shader = CpuBackend::new(SURFACE).failing_shader("link error");
    assert!(RippleEffect::install(&mut shader, EffectConfig::default(), SURFACE).is_err());
    assert_eq!(shader.surface_configurations(), 0);

    for budget in 0..3 {
        let mut starved = CpuBackend::new(SURFACE).with_allocation_budget(budget);
        assert!(RippleEffect::install(&mut starved, EffectConfig::default(), SURFACE).is_err());
        assert_eq!(starved.surface_configurations(), 0, "budget {budget}");
    }

    let mut backend = CpuBackend::new(SURFACE);
    let effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    assert_eq!(effect.backend().surface_configurations(), 1);
}

#[test]
fn missing_context_fails_soft() {
    let backend = CpuBackend::new(SURFACE).without_context();
    assert!(RippleEffect::try_install(backend, EffectConfig::default(), SURFACE).is_none());
}

#[test]
fn shader_failure_leaks_nothing() {
    let mut backend = CpuBackend::new(SURFACE).failing_shader("0:12: 'h' : undeclared identifier");
    let err = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE)
        .err()
        .unwrap();
    match err {
        EffectError::Backend(BackendError::Shader(log)) => assert!(log.contains("undeclared")),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(backend.live_handles(), 0);
}

#[test]
fn invalid_config_fails_before_any_gpu_work() {
    let mut backend = CpuBackend::new(SURFACE);
    let config = EffectConfig {
        wave_speed: 1.0,
        ..EffectConfig::default()
    };
    let err = RippleEffect::install(&mut backend, config, SURFACE).err().unwrap();
    assert!(matches!(err, EffectError::Config(_)));
    assert!(backend.calls().is_empty());
    assert_eq!(backend.live_handles(), 0);
    assert!(backend.released().is_empty());
}

#[test]
fn partial_allocation_failure_is_rolled_back() {
    for budget in 0..3 {
        let mut backend = CpuBackend::new(SURFACE).with_allocation_budget(budget);
        let result = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE);
        assert!(matches!(result, Err(EffectError::Backend(BackendError::Allocation(_)))));
        drop(result);
        assert_eq!(backend.live_handles(), 0, "budget {budget}");
    }
}

#[test]
fn failed_resize_leaves_the_effect_torn_down() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    effect.backend_mut().set_allocation_budget(Some(1));
    assert!(effect.resize(GridSize::new(100, 100)).is_err());
    assert!(!effect.is_running());
    assert_eq!(effect.backend().live_handles(), 0);
}

#[test]
fn pending_video_skips_uploads_but_keeps_rendering() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for _ in 0..3 {
        effect.frame(0.016, still(), &VideoFeed::Pending).unwrap();
    }
    let stats = effect.stats();
    assert_eq!(stats.skipped_uploads, 3);
    assert_eq!(stats.uploads, 0);
    assert_eq!(stats.steps, 3);
    assert_eq!(effect.backend().draw_calls(), 6);

    effect.frame(0.016, still(), &ready_video(SURFACE)).unwrap();
    assert_eq!(effect.stats().uploads, 1);
}

#[test]
fn failed_uploads_are_skipped_and_rendering_continues() {
    let mut backend = CpuBackend::new(SURFACE).failing_uploads();
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for _ in 0..4 {
        effect.frame(0.016, still(), &video).unwrap();
    }
    assert!(effect.is_running());
    let stats = effect.stats();
    assert_eq!(stats.uploads, 0);
    assert_eq!(stats.skipped_uploads, 4);
    assert_eq!(stats.steps, 4);
    assert_eq!(effect.backend().upload_failures(), 4);
    assert_eq!(effect.backend().draw_calls(), 8);

    effect.backend_mut().set_failing_uploads(false);
    effect.frame(0.016, still(), &video).unwrap();
    assert_eq!(effect.stats().uploads, 1);
}

#[test]
fn video_texture_is_released_before_its_replacement() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for size in [GridSize::new(32, 18), GridSize::new(40, 30), GridSize::new(16, 16)] {
        effect.frame(0.016, still(), &ready_video(size)).unwrap();
    }
    assert_eq!(effect.stats().video_reallocations, 3);
    assert_eq!(effect.backend().peak_live_handles(), 4);
}

#[test]
fn failed_video_reallocation_tears_down() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    effect.backend_mut().set_allocation_budget(Some(0));
    let result = effect.frame(0.016, still(), &ready_video(GridSize::new(20, 20)));
    assert!(matches!(result, Err(BackendError::Allocation(_))));
    assert!(!effect.is_running());
    assert_eq!(effect.backend().live_handles(), 0);
    effect.frame(0.016, still(), &ready_video(SURFACE)).unwrap();
}

#[test]
fn video_texture_follows_the_decoded_frame_size() {
    let mut backend = CpuBackend::new(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    let small = ready_video(GridSize::new(32, 18));
    effect.frame(0.016, still(), &small).unwrap();
    effect.frame(0.016, still(), &small).unwrap();
    assert_eq!(effect.stats().video_reallocations, 1);
    assert_eq!(effect.backend().released().len(), 1);
    assert_eq!(effect.backend().live_handles(), 4);

    let uploads: Vec<u32> = effect
        .backend()
        .calls()
        .iter()
        .filter_map(|c| match *c {
            Call::Upload { texture } => Some(texture),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0], uploads[1]);
    assert!(!effect.backend().released().contains(&uploads[0]));
}

#[test]
fn rendering_at_rest_reproduces_the_video() {
    let mut backend = CpuBackend::new(SURFACE);
    let video = ready_video(SURFACE);
    let mut effect = RippleEffect::install(&mut backend, EffectConfig::default(), SURFACE).unwrap();
    for _ in 0..3 {
        effect.frame(0.016, still(), &video).unwrap();
    }
    let VideoFeed::Ready(frame) = &video else {
        unreachable!()
    };
    let out = effect.backend().output();
    for (got, want) in out.pixels().iter().zip(frame.pixels()) {
        for c in 0..4 {
            assert!((got[c] - want[c]).abs() < 1e-5);
        }
    }
}
