//! Per-frame uniform records.
//!
//! Both structs are laid out to match the WGSL uniform blocks in
//! `ripple-gpu/shaders`. The software backend reads the same records, so the
//! CPU reference and the shaders share one parameter path.

use crate::config::{AlphaMode, EffectConfig};
use crate::constants::POINTER_SPEED_EPSILON;
use crate::grid::GridSize;
use crate::pointer::PointerSample;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhysicsUniforms {
    pub texel: [f32; 2],
    pub grid: [f32; 2],
    pub pointer: [f32; 2],
    pub pointer_velocity: [f32; 2],
    pub wave_speed_sq: f32,
    pub spring: f32,
    pub velocity_damping: f32,
    pub height_damping: f32,
    pub dt: f32,
    pub ripple_radius: f32,
    pub ripple_strength: f32,
    pub ripple_falloff: f32,
    pub pointer_speed: f32,
    pub speed_epsilon: f32,
    pub aspect: f32,
    /// Non-zero on the first step after allocation: the read target counts as zero.
    pub reset: f32,
}

impl PhysicsUniforms {
    pub fn new(config: &EffectConfig, grid: GridSize, pointer: &PointerSample, reset: bool) -> Self {
        Self {
            texel: [1.0 / grid.width as f32, 1.0 / grid.height as f32],
            grid: [grid.width as f32, grid.height as f32],
            pointer: pointer.position.to_array(),
            pointer_velocity: pointer.velocity.to_array(),
            wave_speed_sq: config.wave_speed * config.wave_speed,
            spring: config.spring_strength,
            velocity_damping: config.velocity_damping,
            height_damping: config.height_damping,
            dt: config.time_step,
            ripple_radius: config.ripple_radius,
            ripple_strength: config.ripple_strength,
            ripple_falloff: config.ripple_falloff,
            pointer_speed: pointer.speed(),
            speed_epsilon: POINTER_SPEED_EPSILON,
            aspect: grid.aspect(),
            reset: if reset { 1.0 } else { 0.0 },
        }
    }

    #[inline]
    pub fn is_reset(&self) -> bool {
        self.reset > 0.5
    }

    /// Whether this step carries pointer forcing at all.
    #[inline]
    pub fn injects(&self) -> bool {
        self.pointer_speed > self.speed_epsilon
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeUniforms {
    pub resolution: [f32; 2],
    pub grid: [f32; 2],
    pub time: f32,
    pub distortion: f32,
    pub chroma_strength: f32,
    pub chroma_dispersal: f32,
    pub glint_strength: f32,
    pub glint_shininess: f32,
    pub caustics_strength: f32,
    pub caustics_scale: f32,
    pub rest_threshold: f32,
    pub alpha_blend: f32,
    /// Non-zero when the output surface expects premultiplied colour.
    pub premultiply: f32,
    pub _pad: f32,
}

impl CompositeUniforms {
    pub fn new(config: &EffectConfig, surface: GridSize, grid: GridSize, time: f32) -> Self {
        Self {
            resolution: [surface.width as f32, surface.height as f32],
            grid: [grid.width as f32, grid.height as f32],
            time,
            distortion: config.distortion_strength,
            chroma_strength: config.chroma_strength,
            chroma_dispersal: config.chroma_dispersal,
            glint_strength: config.glint_strength,
            glint_shininess: config.glint_shininess,
            caustics_strength: config.caustics_strength,
            caustics_scale: config.caustics_scale,
            rest_threshold: config.rest_threshold,
            alpha_blend: match config.alpha_mode {
                AlphaMode::Opaque => 0.0,
                AlphaMode::StrengthBlended => 1.0,
            },
            premultiply: 0.0,
            _pad: 0.0,
        }
    }

    /// Same record, targeting a surface that composites premultiplied colour.
    pub fn premultiplied(mut self) -> Self {
        self.premultiply = 1.0;
        self
    }
}
