//! Effect lifecycle: install, per-frame step, resize and teardown.

use crate::backend::{BackendError, FrameUpload, RippleBackend};
use crate::config::{ConfigError, EffectConfig};
use crate::grid::GridSize;
use crate::pingpong::PingPong;
use crate::pointer::PointerSample;
use crate::uniforms::{CompositeUniforms, PhysicsUniforms};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Counters for what the effect has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub steps: u64,
    pub uploads: u64,
    pub skipped_uploads: u64,
    pub resizes: u64,
    pub video_reallocations: u64,
}

struct Resources<B: RippleBackend> {
    programs: B::Programs,
    targets: PingPong<B::Target>,
    video: B::Texture,
    video_size: GridSize,
}

pub struct RippleEffect<B: RippleBackend> {
    backend: B,
    config: EffectConfig,
    surface: GridSize,
    grid: GridSize,
    resources: Option<Resources<B>>,
    needs_reset: bool,
    time: f32,
    stats: FrameStats,
}

impl<B: RippleBackend> RippleEffect<B> {
    /// Validate, probe, compile and allocate. Nothing stays allocated on failure.
    ///
    /// The output surface is configured last, so a failed install never
    /// leaves a configured (and possibly opaque) surface over the video.
    pub fn install(mut backend: B, config: EffectConfig, surface: GridSize) -> Result<Self, EffectError> {
        config.validate()?;
        if let Some(missing) = backend.capabilities().missing() {
            return Err(BackendError::Unsupported(missing).into());
        }
        let grid = surface.scaled(config.resolution_scale);
        let programs = backend.compile_programs()?;
        let resources = match allocate(&mut backend, grid, surface) {
            Ok((targets, video)) => Resources {
                programs,
                targets,
                video,
                video_size: surface,
            },
            Err(e) => {
                backend.release_programs(programs);
                return Err(e.into());
            }
        };
        backend.configure_surface(surface);
        log::info!(
            "[effect] installed surface={}x{} grid={}x{}",
            surface.width,
            surface.height,
            grid.width,
            grid.height
        );
        Ok(Self {
            backend,
            config,
            surface,
            grid,
            resources: Some(resources),
            needs_reset: true,
            time: 0.0,
            stats: FrameStats::default(),
        })
    }

    /// Fail-soft install: log the reason and leave the video undistorted.
    pub fn try_install(backend: B, config: EffectConfig, surface: GridSize) -> Option<Self> {
        match Self::install(backend, config, surface) {
            Ok(effect) => Some(effect),
            Err(e) => {
                log::warn!("[effect] not installed, video stays undistorted: {e}");
                None
            }
        }
    }

    /// One animation frame: video upload, one physics step, one composite.
    ///
    /// `dt_sec` only drives the caustics animation; the solver uses the fixed
    /// configured time step.
    pub fn frame(&mut self, dt_sec: f32, pointer: PointerSample, video: &B::Video) -> Result<(), BackendError> {
        let Some(current_video) = self.resources.as_ref().map(|r| r.video_size) else {
            return Ok(());
        };
        let decoded = self.backend.video_size(video);
        if let Some(size) = decoded.filter(|&size| size != current_video) {
            self.reallocate_video(size)?;
        }
        let Some(res) = self.resources.as_mut() else {
            return Ok(());
        };

        let upload = match decoded {
            Some(_) => self.backend.upload_video(&mut res.video, video)?,
            None => FrameUpload::Skipped,
        };
        match upload {
            FrameUpload::Uploaded => self.stats.uploads += 1,
            FrameUpload::Skipped => self.stats.skipped_uploads += 1,
        }

        let physics = PhysicsUniforms::new(&self.config, self.grid, &pointer, self.needs_reset);
        {
            let (read, write) = res.targets.split();
            self.backend.physics_pass(&res.programs, read, write, &physics)?;
        }
        res.targets.swap();
        self.needs_reset = false;
        self.stats.steps += 1;

        self.time += dt_sec.max(0.0);
        let composite = CompositeUniforms::new(&self.config, self.surface, self.grid, self.time);
        self.backend
            .composite_pass(&res.programs, res.targets.read(), &res.video, &composite)
    }

    /// Replace the video texture for a new decoded frame size.
    ///
    /// The old texture is released before the new one is created. If that
    /// allocation fails the effect tears itself down.
    fn reallocate_video(&mut self, size: GridSize) -> Result<(), BackendError> {
        let Some(Resources {
            programs,
            targets,
            video,
            ..
        }) = self.resources.take()
        else {
            return Ok(());
        };
        self.backend.release_texture(video);
        match self.backend.create_video_texture(size) {
            Ok(video) => {
                self.resources = Some(Resources {
                    programs,
                    targets,
                    video,
                    video_size: size,
                });
                self.stats.video_reallocations += 1;
                log::debug!("[effect] video texture now {}x{}", size.width, size.height);
                Ok(())
            }
            Err(e) => {
                log::error!("[effect] video texture allocation failed, tearing down: {e}");
                for target in targets.into_inner() {
                    self.backend.release_target(target);
                }
                self.backend.release_programs(programs);
                Err(e)
            }
        }
    }

    /// Reallocate the state targets for a new surface size.
    ///
    /// Old targets are released before their replacements are created. If the
    /// new allocation fails the effect tears itself down.
    pub fn resize(&mut self, surface: GridSize) -> Result<(), BackendError> {
        if surface == self.surface {
            return Ok(());
        }
        let Some(res) = self.resources.take() else {
            return Ok(());
        };
        let Resources {
            programs,
            targets,
            video,
            video_size,
        } = res;
        for target in targets.into_inner() {
            self.backend.release_target(target);
        }

        let grid = surface.scaled(self.config.resolution_scale);
        self.backend.configure_surface(surface);
        self.surface = surface;
        self.stats.resizes += 1;
        match allocate_pair(&mut self.backend, grid) {
            Ok(targets) => {
                self.resources = Some(Resources {
                    programs,
                    targets,
                    video,
                    video_size,
                });
                self.grid = grid;
                self.needs_reset = true;
                log::info!(
                    "[effect] resized surface={}x{} grid={}x{}",
                    surface.width,
                    surface.height,
                    grid.width,
                    grid.height
                );
                Ok(())
            }
            Err(e) => {
                log::error!("[effect] resize allocation failed, tearing down: {e}");
                self.backend.release_texture(video);
                self.backend.release_programs(programs);
                Err(e)
            }
        }
    }

    /// Release every GPU resource. Safe to call more than once.
    pub fn teardown(&mut self) {
        let Some(res) = self.resources.take() else {
            return;
        };
        for target in res.targets.into_inner() {
            self.backend.release_target(target);
        }
        self.backend.release_texture(res.video);
        self.backend.release_programs(res.programs);
        log::info!("[effect] torn down after {} steps", self.stats.steps);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.resources.is_some()
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn surface_size(&self) -> GridSize {
        self.surface
    }

    pub fn grid_size(&self) -> GridSize {
        self.grid
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Swaps of the current ping-pong pair (reset on reallocation).
    pub fn swaps(&self) -> u64 {
        self.resources.as_ref().map_or(0, |r| r.targets.swaps())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: RippleBackend> Drop for RippleEffect<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn allocate_pair<B: RippleBackend>(
    backend: &mut B,
    grid: GridSize,
) -> Result<PingPong<B::Target>, BackendError> {
    let a = backend.create_state_target(grid)?;
    match backend.create_state_target(grid) {
        Ok(b) => Ok(PingPong::new(a, b)),
        Err(e) => {
            backend.release_target(a);
            Err(e)
        }
    }
}

fn allocate<B: RippleBackend>(
    backend: &mut B,
    grid: GridSize,
    surface: GridSize,
) -> Result<(PingPong<B::Target>, B::Texture), BackendError> {
    let targets = allocate_pair(backend, grid)?;
    match backend.create_video_texture(surface) {
        Ok(video) => Ok((targets, video)),
        Err(e) => {
            for target in targets.into_inner() {
                backend.release_target(target);
            }
            Err(e)
        }
    }
}
