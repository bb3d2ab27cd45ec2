//! CPU wave solver.
//!
//! Explicit finite-difference integrator for a damped 2D wave equation on a
//! grid of `(height, velocity)` texels. This is the reference the WGSL physics
//! pass mirrors line for line; the software backend runs it directly.

use crate::grid::{reflect_index, GridSize};
use crate::uniforms::PhysicsUniforms;
use glam::Vec2;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Texel {
    pub height: f32,
    pub velocity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveField {
    size: GridSize,
    texels: Vec<Texel>,
}

impl WaveField {
    /// A flat field at rest.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            texels: vec![Texel::default(); size.cells()],
        }
    }

    pub fn from_heights(size: GridSize, mut height: impl FnMut(u32, u32) -> f32) -> Self {
        let mut field = Self::new(size);
        for y in 0..size.height {
            for x in 0..size.width {
                field.texels[size.index(x, y)].height = height(x, y);
            }
        }
        field
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Texel {
        self.texels[self.size.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, texel: Texel) {
        let i = self.size.index(x, y);
        self.texels[i] = texel;
    }

    /// Height with reflective boundaries for out-of-range coordinates.
    #[inline]
    pub fn height_at(&self, x: i64, y: i64) -> f32 {
        let rx = reflect_index(x, self.size.width);
        let ry = reflect_index(y, self.size.height);
        self.texels[self.size.index(rx, ry)].height
    }

    /// Central-difference height gradient at a cell.
    #[inline]
    pub fn gradient(&self, x: u32, y: u32) -> Vec2 {
        let (x, y) = (x as i64, y as i64);
        Vec2::new(
            (self.height_at(x + 1, y) - self.height_at(x - 1, y)) * 0.5,
            (self.height_at(x, y + 1) - self.height_at(x, y - 1)) * 0.5,
        )
    }

    pub fn max_abs_height(&self) -> f32 {
        self.texels
            .iter()
            .fold(0.0_f32, |m, t| m.max(t.height.abs()))
    }

    pub fn is_finite(&self) -> bool {
        self.texels
            .iter()
            .all(|t| t.height.is_finite() && t.velocity.is_finite())
    }

    /// Zero every texel, resizing if needed.
    pub fn reset(&mut self, size: GridSize) {
        self.size = size;
        self.texels.clear();
        self.texels.resize(size.cells(), Texel::default());
    }
}

/// What a single step did besides propagation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Sum of height added by pointer forcing across the grid.
    pub injected: f32,
    /// Cells that received any forcing.
    pub forced_cells: u32,
}

/// Advance `read` by one step into `write`.
pub fn step(read: &WaveField, write: &mut WaveField, u: &PhysicsUniforms) -> StepReport {
    let size = read.size();
    if write.size() != size {
        write.reset(size);
    }
    let reset = u.is_reset();
    let load = |x: i64, y: i64| -> Texel {
        if reset {
            return Texel::default();
        }
        let rx = reflect_index(x, size.width);
        let ry = reflect_index(y, size.height);
        read.texels[size.index(rx, ry)]
    };

    let pointer = Vec2::from_array(u.pointer);
    let texel = Vec2::from_array(u.texel);
    let injects = u.injects();
    let mut report = StepReport::default();

    for y in 0..size.height {
        for x in 0..size.width {
            let (xi, yi) = (x as i64, y as i64);
            let c = load(xi, yi);
            let lap = load(xi - 1, yi).height
                + load(xi + 1, yi).height
                + load(xi, yi - 1).height
                + load(xi, yi + 1).height
                - 4.0 * c.height;

            let mut v = c.velocity + u.wave_speed_sq * lap * u.dt;
            v -= u.spring * c.height * u.dt;
            v *= u.velocity_damping;
            let mut h = c.height + v * u.dt;
            h *= u.height_damping;

            if injects {
                let cell_uv = (Vec2::new(x as f32, y as f32) + 0.5) * texel;
                let d = ((cell_uv - pointer) * Vec2::new(u.aspect, 1.0)).length();
                if d < u.ripple_radius {
                    let impulse = (1.0 - d / u.ripple_radius).powf(u.ripple_falloff)
                        * u.pointer_speed
                        * u.ripple_strength;
                    h += impulse;
                    report.injected += impulse;
                    report.forced_cells += 1;
                }
            }

            write.texels[size.index(x, y)] = Texel {
                height: h,
                velocity: v,
            };
        }
    }
    report
}
