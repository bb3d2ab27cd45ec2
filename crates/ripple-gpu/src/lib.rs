//! `wgpu` implementation of [`RippleBackend`].
//!
//! Physics and composite are fullscreen-triangle render passes. Each pass is
//! submitted in its own command buffer on the one queue, so the composite of a
//! frame always sees the state the physics pass of that frame wrote.

use std::marker::PhantomData;

use ripple_core::{
    AlphaMode, BackendError, Capabilities, CompositeUniforms, FrameUpload, GridSize,
    PhysicsUniforms, RippleBackend,
};

mod helpers;
mod passes;
mod targets;

pub use passes::GpuPrograms;
pub use targets::GpuTexture;

pub const PHYSICS_WGSL: &str = include_str!("../shaders/physics.wgsl");
pub const COMPOSITE_WGSL: &str = include_str!("../shaders/composite.wgsl");

/// A source of video frames the backend can copy into its video texture.
pub trait FrameSource {
    /// Size of the current decoded frame, or `None` while nothing is decoded.
    fn frame_size(&self) -> Option<GridSize>;

    /// Copy the current frame into `target`, which has the size last reported
    /// by [`FrameSource::frame_size`].
    fn upload(&self, queue: &wgpu::Queue, target: &GpuTexture) -> anyhow::Result<()>;
}

pub struct WgpuBackend<V: ?Sized> {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    configured: bool,
    video_format: wgpu::TextureFormat,
    capabilities: Capabilities,
    physics_shader: wgpu::ShaderModule,
    composite_shader: wgpu::ShaderModule,
    premultiply: bool,
    upload_failures: u32,
    frames_presented: u64,
    _video: PhantomData<fn(&V)>,
}

impl<V: FrameSource + ?Sized> WgpuBackend<V> {
    /// Request a device for `surface` and compile both shaders.
    ///
    /// A missing float render target capability is not an error here; it is
    /// reported through [`RippleBackend::capabilities`] so the effect decides.
    /// The surface itself stays unconfigured until the effect has installed
    /// and calls [`RippleBackend::configure_surface`].
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        size: GridSize,
        alpha: AlphaMode,
    ) -> Result<Self, BackendError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(BackendError::Unsupported("graphics context"))?;
        let info = adapter.get_info();
        log::info!("[gpu] adapter {} ({:?})", info.name, info.backend);

        let float_render_targets = adapter
            .get_texture_format_features(targets::STATE_FORMAT)
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("ripple_device"),
                    required_features: wgpu::Features::empty(),
                    // WebGL2 fallback cannot meet the full WebGPU defaults
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| {
                log::error!("[gpu] request_device failed: {e}");
                BackendError::Unsupported("graphics context")
            })?;
        device.on_uncaptured_error(Box::new(|e: wgpu::Error| {
            log::error!("[gpu] uncaptured error: {e}")
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(BackendError::Unsupported("graphics context"))?;
        let browser = info.backend == wgpu::Backend::BrowserWebGpu;
        let (alpha_mode, premultiply) = pick_alpha_mode(&caps.alpha_modes, alpha, browser);
        let video_format = targets::video_format_for(format);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let physics_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("physics_wgsl"),
            source: wgpu::ShaderSource::Wgsl(PHYSICS_WGSL.into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite_wgsl"),
            source: wgpu::ShaderSource::Wgsl(COMPOSITE_WGSL.into()),
        });
        if let Some(err) = device.pop_error_scope().await {
            log::error!("[gpu] shader compilation failed: {err}");
            return Err(BackendError::Shader(err.to_string()));
        }

        log::info!(
            "[gpu] surface {}x{} {:?} video={:?} alpha={:?} float_targets={}",
            size.width,
            size.height,
            format,
            video_format,
            alpha_mode,
            float_render_targets
        );
        Ok(Self {
            surface,
            device,
            queue,
            config,
            configured: false,
            video_format,
            capabilities: Capabilities {
                graphics_context: true,
                float_render_targets,
            },
            physics_shader,
            composite_shader,
            premultiply,
            upload_failures: 0,
            frames_presented: 0,
            _video: PhantomData,
        })
    }

    /// Frames actually presented to the surface so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    fn check_size(&self, size: GridSize) -> Result<(), BackendError> {
        let max = self.device.limits().max_texture_dimension_2d;
        if size.width > max || size.height > max {
            return Err(BackendError::Allocation(format!(
                "{}x{} exceeds the {max} texel limit",
                size.width, size.height
            )));
        }
        Ok(())
    }
}

/// Surface alpha mode for the requested output, and whether the shader must
/// premultiply its colour for it.
///
/// A browser WebGPU canvas only reports `Opaque` but always accepts
/// premultiplied compositing, so `browser` allows it regardless.
fn pick_alpha_mode(
    available: &[wgpu::CompositeAlphaMode],
    alpha: AlphaMode,
    browser: bool,
) -> (wgpu::CompositeAlphaMode, bool) {
    use wgpu::CompositeAlphaMode as M;
    let first = available.first().copied().unwrap_or(M::Auto);
    match alpha {
        AlphaMode::Opaque => {
            if available.contains(&M::Opaque) {
                (M::Opaque, false)
            } else {
                (first, first == M::PreMultiplied)
            }
        }
        AlphaMode::StrengthBlended => {
            if available.contains(&M::PostMultiplied) {
                (M::PostMultiplied, false)
            } else if browser || available.contains(&M::PreMultiplied) {
                (M::PreMultiplied, true)
            } else {
                log::warn!("[gpu] no blending alpha mode, output stays opaque");
                (first, false)
            }
        }
    }
}

impl<V: FrameSource + ?Sized> RippleBackend for WgpuBackend<V> {
    type Target = GpuTexture;
    type Texture = GpuTexture;
    type Programs = GpuPrograms;
    type Video = V;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn compile_programs(&mut self) -> Result<GpuPrograms, BackendError> {
        Ok(passes::create_programs(
            &self.device,
            &self.physics_shader,
            &self.composite_shader,
            self.config.format,
        ))
    }

    fn create_state_target(&mut self, size: GridSize) -> Result<GpuTexture, BackendError> {
        self.check_size(size)?;
        Ok(GpuTexture::state_target(&self.device, size))
    }

    fn create_video_texture(&mut self, size: GridSize) -> Result<GpuTexture, BackendError> {
        self.check_size(size)?;
        Ok(GpuTexture::video(&self.device, size, self.video_format))
    }

    fn configure_surface(&mut self, size: GridSize) {
        if self.configured && size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.configured = true;
    }

    fn video_size(&self, video: &V) -> Option<GridSize> {
        video.frame_size()
    }

    fn upload_video(&mut self, texture: &mut GpuTexture, video: &V) -> Result<FrameUpload, BackendError> {
        match video.upload(&self.queue, texture) {
            Ok(()) => Ok(FrameUpload::Uploaded),
            Err(e) => {
                if self.upload_failures == 0 {
                    log::warn!("[gpu] video upload failed, keeping last frame: {e:#}");
                }
                self.upload_failures += 1;
                Ok(FrameUpload::Skipped)
            }
        }
    }

    fn physics_pass(
        &mut self,
        programs: &GpuPrograms,
        read: &GpuTexture,
        write: &mut GpuTexture,
        uniforms: &PhysicsUniforms,
    ) -> Result<(), BackendError> {
        self.queue
            .write_buffer(&programs.physics_uniforms, 0, bytemuck::bytes_of(uniforms));
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("physics_encoder"),
            });
        passes::encode_physics(&self.device, &mut encoder, programs, read, write);
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn composite_pass(
        &mut self,
        programs: &GpuPrograms,
        state: &GpuTexture,
        video: &GpuTexture,
        uniforms: &CompositeUniforms,
    ) -> Result<(), BackendError> {
        if !self.configured {
            return Ok(());
        }
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("[gpu] surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(BackendError::Surface(e.to_string())),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let u = if self.premultiply {
            uniforms.premultiplied()
        } else {
            *uniforms
        };
        self.queue
            .write_buffer(&programs.composite_uniforms, 0, bytemuck::bytes_of(&u));
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("composite_encoder"),
            });
        passes::encode_composite(&self.device, &mut encoder, programs, state, video, &view);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.frames_presented += 1;
        Ok(())
    }

    fn release_target(&mut self, target: GpuTexture) {
        target.destroy();
    }

    fn release_texture(&mut self, texture: GpuTexture) {
        texture.destroy();
    }

    fn release_programs(&mut self, programs: GpuPrograms) {
        programs.physics_uniforms.destroy();
        programs.composite_uniforms.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::CompositeAlphaMode as M;

    #[test]
    fn opaque_prefers_opaque_surface() {
        assert_eq!(
            pick_alpha_mode(&[M::PreMultiplied, M::Opaque], AlphaMode::Opaque, false),
            (M::Opaque, false)
        );
        assert_eq!(pick_alpha_mode(&[M::Opaque], AlphaMode::Opaque, true), (M::Opaque, false));
    }

    #[test]
    fn blended_falls_back_to_premultiplied() {
        let (mode, premultiply) = pick_alpha_mode(&[M::Opaque, M::PreMultiplied], AlphaMode::StrengthBlended, false);
        assert_eq!(mode, M::PreMultiplied);
        assert!(premultiply);
    }

    #[test]
    fn browser_canvas_blends_although_it_reports_opaque_only() {
        assert_eq!(
            pick_alpha_mode(&[M::Opaque], AlphaMode::StrengthBlended, true),
            (M::PreMultiplied, true)
        );
        assert_eq!(
            pick_alpha_mode(&[M::Opaque], AlphaMode::StrengthBlended, false),
            (M::Opaque, false)
        );
    }

    #[test]
    fn shaders_declare_the_expected_entry_points() {
        for entry in ["fn vs_fullscreen", "fn fs_physics"] {
            assert!(PHYSICS_WGSL.contains(entry));
        }
        for entry in ["fn vs_fullscreen", "fn fs_composite"] {
            assert!(COMPOSITE_WGSL.contains(entry));
        }
    }
}
