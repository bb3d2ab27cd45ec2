//! The seam between effect lifecycle and a graphics API.
//!
//! [`crate::effect::RippleEffect`] decides *when* resources are created,
//! used and released; a backend decides *how*. Handles are owned values that
//! are handed back to the backend exactly once through the `release_*` calls.

use crate::grid::GridSize;
use crate::uniforms::{CompositeUniforms, PhysicsUniforms};

/// GPU features the effect cannot run without.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// A usable graphics context/device exists.
    pub graphics_context: bool,
    /// Floating-point textures can be both rendered to and sampled.
    pub float_render_targets: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities {
        graphics_context: true,
        float_render_targets: true,
    };

    /// The first missing capability, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if !self.graphics_context {
            Some("graphics context")
        } else if !self.float_render_targets {
            Some("floating-point render targets")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("missing GPU capability: {0}")]
    Unsupported(&'static str),
    #[error("shader compilation failed: {0}")]
    Shader(String),
    #[error("GPU allocation failed: {0}")]
    Allocation(String),
    #[error("surface error: {0}")]
    Surface(String),
}

/// Outcome of the per-frame video upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameUpload {
    Uploaded,
    /// No decoded frame yet; the previous texture contents stay on screen.
    Skipped,
}

pub trait RippleBackend {
    /// One simulation state render target.
    type Target;
    /// The texture holding the latest video frame.
    type Texture;
    /// Compiled physics and composite programs.
    type Programs;
    /// Whatever the host hands in as its video source.
    type Video: ?Sized;

    fn capabilities(&self) -> Capabilities;

    fn compile_programs(&mut self) -> Result<Self::Programs, BackendError>;

    /// A zero-initialised state target of the given grid size.
    fn create_state_target(&mut self, size: GridSize) -> Result<Self::Target, BackendError>;

    fn create_video_texture(&mut self, size: GridSize) -> Result<Self::Texture, BackendError>;

    /// Output surface changed size.
    fn configure_surface(&mut self, _size: GridSize) {}

    /// Dimensions of the decoded frame, or `None` while nothing is decoded.
    fn video_size(&self, video: &Self::Video) -> Option<GridSize>;

    fn upload_video(
        &mut self,
        texture: &mut Self::Texture,
        video: &Self::Video,
    ) -> Result<FrameUpload, BackendError>;

    /// Read `read`, write `write`. The two are always distinct targets.
    fn physics_pass(
        &mut self,
        programs: &Self::Programs,
        read: &Self::Target,
        write: &mut Self::Target,
        uniforms: &PhysicsUniforms,
    ) -> Result<(), BackendError>;

    fn composite_pass(
        &mut self,
        programs: &Self::Programs,
        state: &Self::Target,
        video: &Self::Texture,
        uniforms: &CompositeUniforms,
    ) -> Result<(), BackendError>;

    fn release_target(&mut self, target: Self::Target);

    fn release_texture(&mut self, texture: Self::Texture);

    fn release_programs(&mut self, programs: Self::Programs);
}

/// Lend a backend to an effect and keep access to it afterwards.
impl<B: RippleBackend + ?Sized> RippleBackend for &mut B {
    type Target = B::Target;
    type Texture = B::Texture;
    type Programs = B::Programs;
    type Video = B::Video;

    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn compile_programs(&mut self) -> Result<Self::Programs, BackendError> {
        (**self).compile_programs()
    }

    fn create_state_target(&mut self, size: GridSize) -> Result<Self::Target, BackendError> {
        (**self).create_state_target(size)
    }

    fn create_video_texture(&mut self, size: GridSize) -> Result<Self::Texture, BackendError> {
        (**self).create_video_texture(size)
    }

    fn configure_surface(&mut self, size: GridSize) {
        (**self).configure_surface(size)
    }

    fn video_size(&self, video: &Self::Video) -> Option<GridSize> {
        (**self).video_size(video)
    }

    fn upload_video(
        &mut self,
        texture: &mut Self::Texture,
        video: &Self::Video,
    ) -> Result<FrameUpload, BackendError> {
        (**self).upload_video(texture, video)
    }

    fn physics_pass(
        &mut self,
        programs: &Self::Programs,
        read: &Self::Target,
        write: &mut Self::Target,
        uniforms: &PhysicsUniforms,
    ) -> Result<(), BackendError> {
        (**self).physics_pass(programs, read, write, uniforms)
    }

    fn composite_pass(
        &mut self,
        programs: &Self::Programs,
        state: &Self::Target,
        video: &Self::Texture,
        uniforms: &CompositeUniforms,
    ) -> Result<(), BackendError> {
        (**self).composite_pass(programs, state, video, uniforms)
    }

    fn release_target(&mut self, target: Self::Target) {
        (**self).release_target(target)
    }

    fn release_texture(&mut self, texture: Self::Texture) {
        (**self).release_texture(texture)
    }

    fn release_programs(&mut self, programs: Self::Programs) {
        (**self).release_programs(programs)
    }
}
