//! Software implementation of [`RippleBackend`].
//!
//! Runs the physics and composite passes on the CPU and keeps a ledger of
//! every handle it hands out and every pass it executes. Headless hosts can use
//! it to render without a GPU; tests use the ledger to check the lifecycle
//! invariants by construction.

use crate::backend::{BackendError, Capabilities, FrameUpload, RippleBackend};
use crate::composite::{composite, VideoFrame};
use crate::grid::GridSize;
use crate::sim::{step, StepReport, WaveField};
use crate::uniforms::{CompositeUniforms, PhysicsUniforms};
use fnv::FnvHashSet;

pub type HandleId = u32;

#[derive(Debug)]
pub struct CpuTarget {
    id: HandleId,
    field: WaveField,
}

impl CpuTarget {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn field(&self) -> &WaveField {
        &self.field
    }
}

#[derive(Debug)]
pub struct CpuTexture {
    id: HandleId,
    frame: VideoFrame,
}

impl CpuTexture {
    pub fn id(&self) -> HandleId {
        self.id
    }
}

#[derive(Debug)]
pub struct CpuPrograms {
    id: HandleId,
}

/// The software stand-in for a video element.
#[derive(Clone, Debug)]
pub enum VideoFeed {
    /// Nothing decoded yet.
    Pending,
    Ready(VideoFrame),
}

/// One recorded backend call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Physics { read: HandleId, write: HandleId },
    Composite { state: HandleId, video: HandleId },
    Upload { texture: HandleId },
}

impl Call {
    #[inline]
    pub fn is_draw(&self) -> bool {
        matches!(self, Call::Physics { .. } | Call::Composite { .. })
    }
}

#[derive(Debug)]
pub struct CpuBackend {
    capabilities: Capabilities,
    shader_failure: Option<String>,
    allocation_budget: Option<usize>,
    failing_uploads: bool,
    upload_failures: u32,
    surface_configurations: u32,
    next_id: HandleId,
    live: FnvHashSet<HandleId>,
    peak_live: usize,
    released: Vec<HandleId>,
    calls: Vec<Call>,
    aliasing_violations: u32,
    surface: GridSize,
    output: VideoFrame,
    last_report: StepReport,
    latest_state: Option<WaveField>,
}

impl CpuBackend {
    pub fn new(surface: GridSize) -> Self {
        Self {
            capabilities: Capabilities::FULL,
            shader_failure: None,
            allocation_budget: None,
            failing_uploads: false,
            upload_failures: 0,
            surface_configurations: 0,
            next_id: 1,
            live: FnvHashSet::default(),
            peak_live: 0,
            released: Vec::new(),
            calls: Vec::new(),
            aliasing_violations: 0,
            surface,
            output: VideoFrame::new(surface),
            last_report: StepReport::default(),
            latest_state: None,
        }
    }

    /// Behave like a context without float render target support.
    pub fn without_float_targets(mut self) -> Self {
        self.capabilities.float_render_targets = false;
        self
    }

    /// Behave like a host with no graphics context at all.
    pub fn without_context(mut self) -> Self {
        self.capabilities.graphics_context = false;
        self
    }

    /// Make program compilation fail with the given compiler log.
    pub fn failing_shader(mut self, log: impl Into<String>) -> Self {
        self.shader_failure = Some(log.into());
        self
    }

    /// Allow only this many more texture/target allocations.
    pub fn with_allocation_budget(mut self, budget: usize) -> Self {
        self.allocation_budget = Some(budget);
        self
    }

    pub fn set_allocation_budget(&mut self, budget: Option<usize>) {
        self.allocation_budget = budget;
    }

    /// Make every video upload fail, like a video the GPU may not read.
    pub fn failing_uploads(mut self) -> Self {
        self.failing_uploads = true;
        self
    }

    pub fn set_failing_uploads(&mut self, failing: bool) {
        self.failing_uploads = failing;
    }

    pub fn upload_failures(&self) -> u32 {
        self.upload_failures
    }

    /// How often the output surface has been configured.
    pub fn surface_configurations(&self) -> u32 {
        self.surface_configurations
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn draw_calls(&self) -> usize {
        self.calls.iter().filter(|c| c.is_draw()).count()
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Most handles that were ever live at the same time.
    pub fn peak_live_handles(&self) -> usize {
        self.peak_live
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.live.contains(&id)
    }

    pub fn released(&self) -> &[HandleId] {
        &self.released
    }

    /// Physics passes that were asked to read and write the same target.
    pub fn aliasing_violations(&self) -> u32 {
        self.aliasing_violations
    }

    pub fn surface(&self) -> GridSize {
        self.surface
    }

    /// The last composited image.
    pub fn output(&self) -> &VideoFrame {
        &self.output
    }

    /// Report of the last physics pass.
    pub fn last_step_report(&self) -> StepReport {
        self.last_report
    }

    /// Copy of the state the last composite read.
    pub fn latest_state(&self) -> Option<&WaveField> {
        self.latest_state.as_ref()
    }

    fn acquire(&mut self) -> Result<HandleId, BackendError> {
        if let Some(budget) = self.allocation_budget.as_mut() {
            if *budget == 0 {
                return Err(BackendError::Allocation("allocation budget exhausted".into()));
            }
            *budget -= 1;
        }
        Ok(self.insert_live())
    }

    fn insert_live(&mut self) -> HandleId {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        self.peak_live = self.peak_live.max(self.live.len());
        id
    }

    fn release(&mut self, id: HandleId) {
        if self.live.remove(&id) {
            self.released.push(id);
        } else {
            log::error!("[cpu] double release of handle {id}");
        }
    }
}

impl RippleBackend for CpuBackend {
    type Target = CpuTarget;
    type Texture = CpuTexture;
    type Programs = CpuPrograms;
    type Video = VideoFeed;

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn compile_programs(&mut self) -> Result<CpuPrograms, BackendError> {
        if let Some(log) = &self.shader_failure {
            log::error!("[cpu] program link failed: {log}");
            return Err(BackendError::Shader(log.clone()));
        }
        Ok(CpuPrograms {
            id: self.insert_live(),
        })
    }

    fn create_state_target(&mut self, size: GridSize) -> Result<CpuTarget, BackendError> {
        let id = self.acquire()?;
        Ok(CpuTarget {
            id,
            field: WaveField::new(size),
        })
    }

    fn create_video_texture(&mut self, size: GridSize) -> Result<CpuTexture, BackendError> {
        let id = self.acquire()?;
        Ok(CpuTexture {
            id,
            frame: VideoFrame::new(size),
        })
    }

    fn configure_surface(&mut self, size: GridSize) {
        self.surface_configurations += 1;
        self.surface = size;
        self.output.reset(size);
    }

    fn video_size(&self, video: &VideoFeed) -> Option<GridSize> {
        match video {
            VideoFeed::Pending => None,
            VideoFeed::Ready(frame) => Some(frame.size()),
        }
    }

    fn upload_video(&mut self, texture: &mut CpuTexture, video: &VideoFeed) -> Result<FrameUpload, BackendError> {
        match video {
            VideoFeed::Pending => Ok(FrameUpload::Skipped),
            VideoFeed::Ready(_) if self.failing_uploads => {
                if self.upload_failures == 0 {
                    log::warn!("[cpu] video upload failed, keeping last frame");
                }
                self.upload_failures += 1;
                Ok(FrameUpload::Skipped)
            }
            VideoFeed::Ready(frame) => {
                texture.frame.clone_from(frame);
                self.calls.push(Call::Upload { texture: texture.id });
                Ok(FrameUpload::Uploaded)
            }
        }
    }

    fn physics_pass(
        &mut self,
        _programs: &CpuPrograms,
        read: &CpuTarget,
        write: &mut CpuTarget,
        uniforms: &PhysicsUniforms,
    ) -> Result<(), BackendError> {
        if read.id == write.id {
            self.aliasing_violations += 1;
        }
        self.calls.push(Call::Physics {
            read: read.id,
            write: write.id,
        });
        self.last_report = step(&read.field, &mut write.field, uniforms);
        Ok(())
    }

    fn composite_pass(
        &mut self,
        _programs: &CpuPrograms,
        state: &CpuTarget,
        video: &CpuTexture,
        uniforms: &CompositeUniforms,
    ) -> Result<(), BackendError> {
        self.calls.push(Call::Composite {
            state: state.id,
            video: video.id,
        });
        composite(&state.field, &video.frame, uniforms, &mut self.output);
        match self.latest_state.as_mut() {
            Some(latest) => latest.clone_from(&state.field),
            None => self.latest_state = Some(state.field.clone()),
        }
        Ok(())
    }

    fn release_target(&mut self, target: CpuTarget) {
        self.release(target.id);
    }

    fn release_texture(&mut self, texture: CpuTexture) {
        self.release(texture.id);
    }

    fn release_programs(&mut self, programs: CpuPrograms) {
        self.release(programs.id);
    }
}
