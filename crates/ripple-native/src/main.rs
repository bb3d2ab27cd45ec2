use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use glam::Vec2;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use ripple_core::{normalize_in_rect, GridSize, PointerState, Preset, RippleEffect};
use ripple_gpu::WgpuBackend;

mod pattern;

use pattern::TestPattern;

const PATTERN_SIZE: (u32, u32) = (640, 360);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let preset = match std::env::args().nth(1) {
        Some(name) => Preset::from_name(&name).with_context(|| {
            let known: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
            format!("unknown preset '{name}', expected one of {}", known.join(", "))
        })?,
        None => Preset::Hero,
    };
    let config = preset.config();
    log::info!("[native] preset {}", preset.name());

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Ripple (native)")
            .build(&event_loop)?,
    );
    let size = window.inner_size();
    let surface_size = GridSize::new(size.width, size.height);

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let backend = pollster::block_on(WgpuBackend::<TestPattern>::new(
        &instance,
        surface,
        surface_size,
        config.alpha_mode,
    ))?;
    let mut effect = RippleEffect::install(backend, config, surface_size)?;

    let mut pattern = TestPattern::new(GridSize::new(PATTERN_SIZE.0, PATTERN_SIZE.1));
    let mut pointer = PointerState::default();
    let start = Instant::now();
    let mut last_frame = start;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CursorMoved { position, .. } => {
                let size = window.inner_size();
                let client = Vec2::new(position.x as f32, position.y as f32);
                let extent = Vec2::new(size.width as f32, size.height as f32);
                match normalize_in_rect(client, Vec2::ZERO, extent) {
                    Some(uv) => pointer.record(uv),
                    None => pointer.leave(),
                }
            }
            WindowEvent::CursorLeft { .. } => pointer.leave(),
            WindowEvent::Resized(size) => {
                // minimised windows report 0x0
                if size.width == 0 || size.height == 0 {
                    return;
                }
                if let Err(e) = effect.resize(GridSize::new(size.width, size.height)) {
                    log::error!("[native] resize failed: {e}");
                    elwt.exit();
                }
            }
            WindowEvent::CloseRequested => {
                effect.teardown();
                elwt.exit();
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let dt = (now - last_frame).as_secs_f32();
            last_frame = now;
            pattern.advance(start.elapsed().as_secs_f32());
            if let Err(e) = effect.frame(dt, pointer.take_sample(), &pattern) {
                log::error!("[native] frame failed, stopping: {e}");
                effect.teardown();
                elwt.exit();
                return;
            }
            window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
