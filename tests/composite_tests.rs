// Host-side tests for the composite pass.
// The main crate is wasm-only, so these drive ripple-core's CPU reference directly.

use glam::Vec2;
use ripple_core::{
    caustics, composite, shade, AlphaMode, CompositeUniforms, EffectConfig, GridSize, VideoFrame,
    WaveField,
};

fn test_video(size: GridSize) -> VideoFrame {
    VideoFrame::from_fn(size, |x, y| {
        let u = x as f32 / size.width as f32;
        let v = y as f32 / size.height as f32;
        [u, v, 1.0 - u * v, 1.0]
    })
}

fn bump(size: GridSize, amplitude: f32) -> WaveField {
    let cx = size.width as f32 / 2.0;
    let cy = size.height as f32 / 2.0;
    WaveField::from_heights(size, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        amplitude * (-(dx * dx + dy * dy) / 6.0).exp()
    })
}

fn uniforms(config: &EffectConfig, surface: GridSize, grid: GridSize) -> CompositeUniforms {
    CompositeUniforms::new(config, surface, grid, 1.25)
}

#[test]
fn flat_water_shows_the_video_unchanged() {
    let config = EffectConfig::default();
    let surface = GridSize::new(32, 24);
    let grid = surface.scaled(config.resolution_scale);
    let video = test_video(surface);
    let field = WaveField::new(grid);
    let mut out = VideoFrame::new(surface);

    composite(&field, &video, &uniforms(&config, surface, grid), &mut out);

    for y in 0..surface.height {
        for x in 0..surface.width {
            let got = out.pixel(x, y);
            let want = video.pixel(x, y);
            for c in 0..4 {
                assert!((got[c] - want[c]).abs() < 1e-5, "({x},{y}) channel {c}: {got:?} vs {want:?}");
            }
        }
    }
}

#[test]
fn activity_below_threshold_is_identity() {
    let config = EffectConfig::default();
    let surface = GridSize::new(16, 16);
    let video = test_video(surface);
    let field = bump(surface, config.rest_threshold * 0.2);
    let u = uniforms(&config, surface, surface);
    let uv = Vec2::new(0.5, 0.5) + Vec2::splat(0.5 / 16.0);
    let got = shade(&field, &video, &u, uv);
    let want = video.sample(uv);
    assert!((got - want).abs().max_element() < 1e-5);
}

#[test]
fn disturbed_water_splits_colour_and_refracts() {
    let config = EffectConfig::default();
    let surface = GridSize::new(48, 48);
    let video = test_video(surface);
    let field = bump(surface, 0.5);
    let mut out = VideoFrame::new(surface);
    composite(&field, &video, &uniforms(&config, surface, surface), &mut out);

    let changed = (0..surface.height)
        .flat_map(|y| (0..surface.width).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let got = out.pixel(x, y);
            let want = video.pixel(x, y);
            (got[0] - want[0]).abs() > 1e-3 || (got[2] - want[2]).abs() > 1e-3
        })
        .count();
    assert!(changed > 0);

    // far corner is still at rest
    let corner = out.pixel(0, 0);
    let video_corner = video.pixel(0, 0);
    for c in 0..4 {
        assert!((corner[c] - video_corner[c]).abs() < 1e-5);
    }
}

#[test]
fn blended_alpha_follows_effect_strength() {
    let config = EffectConfig {
        alpha_mode: AlphaMode::StrengthBlended,
        ..EffectConfig::default()
    };
    let surface = GridSize::new(32, 32);
    let video = test_video(surface);
    let field = bump(surface, 0.5);
    let u = uniforms(&config, surface, surface);

    let rest = shade(&field, &video, &u, Vec2::new(0.01, 0.01));
    assert_eq!(rest.w, 0.0);
    let active = shade(&field, &video, &u, Vec2::new(0.55, 0.5));
    assert!(active.w > 0.0 && active.w <= 1.0);
}

#[test]
fn premultiplied_output_scales_colour_by_alpha() {
    let config = EffectConfig {
        alpha_mode: AlphaMode::StrengthBlended,
        ..EffectConfig::default()
    };
    let surface = GridSize::new(32, 32);
    let video = test_video(surface);
    let field = bump(surface, 0.02);
    let straight = uniforms(&config, surface, surface);
    let premultiplied = straight.premultiplied();
    let uv = Vec2::new(0.6, 0.45);

    let a = shade(&field, &video, &straight, uv);
    let b = shade(&field, &video, &premultiplied, uv);
    assert_eq!(a.w, b.w);
    assert!((a.truncate() * a.w - b.truncate()).abs().max_element() < 1e-6);
}

#[test]
fn caustics_stay_in_unit_range_and_drift() {
    let mut moved = false;
    for i in 0..64 {
        let uv = Vec2::new(i as f32 / 64.0, (i * 7 % 64) as f32 / 64.0);
        let now = caustics(uv, 9.0, 0.0);
        let later = caustics(uv, 9.0, 5.0);
        assert!((0.0..=1.0).contains(&now));
        assert!((0.0..=1.0).contains(&later));
        moved |= (now - later).abs() > 1e-4;
    }
    assert!(moved);
}
