//! CPU reference for the composite pass: refraction, chromatic split, glint
//! and caustics over a video frame, driven by the current wave field.

use crate::constants::{CAUSTICS_DRIFT, CAUSTICS_OCTAVES, LIGHT_DIR, NORMAL_SCALE, REST_MASK_SPAN};
use crate::grid::GridSize;
use crate::sim::WaveField;
use crate::uniforms::CompositeUniforms;
use glam::{Vec2, Vec3, Vec4};

/// RGBA float image with clamp-to-edge bilinear sampling.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    size: GridSize,
    pixels: Vec<[f32; 4]>,
}

impl VideoFrame {
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            pixels: vec![[0.0; 4]; size.cells()],
        }
    }

    pub fn from_fn(size: GridSize, mut f: impl FnMut(u32, u32) -> [f32; 4]) -> Self {
        let mut frame = Self::new(size);
        for y in 0..size.height {
            for x in 0..size.width {
                frame.pixels[size.index(x, y)] = f(x, y);
            }
        }
        frame
    }

    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[self.size.index(x, y)]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [f32; 4]) {
        let i = self.size.index(x, y);
        self.pixels[i] = rgba;
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    /// Resize and clear to transparent black.
    pub fn reset(&mut self, size: GridSize) {
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(size.cells(), [0.0; 4]);
    }

    /// Quantised 8-bit RGBA bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8))
            .collect()
    }

    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let w = self.size.width as f32;
        let h = self.size.height as f32;
        let px = uv.x * w - 0.5;
        let py = uv.y * h - 0.5;
        let x0 = px.floor();
        let y0 = py.floor();
        let fx = px - x0;
        let fy = py - y0;
        let max_x = self.size.width as i64 - 1;
        let max_y = self.size.height as i64 - 1;
        let fetch = |x: f32, y: f32| {
            let xi = (x as i64).clamp(0, max_x) as u32;
            let yi = (y as i64).clamp(0, max_y) as u32;
            Vec4::from_array(self.pixel(xi, yi))
        };
        let top = fetch(x0, y0).lerp(fetch(x0 + 1.0, y0), fx);
        let bottom = fetch(x0, y0 + 1.0).lerp(fetch(x0 + 1.0, y0 + 1.0), fx);
        top.lerp(bottom, fy)
    }
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn fract(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn hash(p: Vec2) -> f32 {
    fract((p.dot(Vec2::new(127.1, 311.7))).sin() * 43_758.547)
}

fn value_noise(p: Vec2) -> f32 {
    let i = p.floor();
    let f = p - i;
    let u = f * f * (Vec2::splat(3.0) - 2.0 * f);
    let a = hash(i);
    let b = hash(i + Vec2::new(1.0, 0.0));
    let c = hash(i + Vec2::new(0.0, 1.0));
    let d = hash(i + Vec2::new(1.0, 1.0));
    let ab = a + (b - a) * u.x;
    let cd = c + (d - c) * u.x;
    ab + (cd - ab) * u.y
}

/// Layered value noise in `[0, 1]`, drifting with time.
pub fn caustics(uv: Vec2, scale: f32, time: f32) -> f32 {
    let drift = Vec2::from_array(CAUSTICS_DRIFT);
    let mut sum = 0.0;
    let mut norm = 0.0;
    let mut amp = 0.5;
    let mut freq = 1.0;
    for _ in 0..CAUSTICS_OCTAVES {
        sum += amp * value_noise(uv * scale * freq + drift * time * freq);
        norm += amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    sum / norm
}

/// Shade one output pixel at `uv`.
pub fn shade(field: &WaveField, video: &VideoFrame, u: &CompositeUniforms, uv: Vec2) -> Vec4 {
    let grid = field.size();
    let cx = ((uv.x * grid.width as f32).floor() as i64).clamp(0, grid.width as i64 - 1) as u32;
    let cy = ((uv.y * grid.height as f32).floor() as i64).clamp(0, grid.height as i64 - 1) as u32;
    let h = field.get(cx, cy).height;
    let grad = field.gradient(cx, cy);

    let activity = h.abs() + grad.length();
    let mask = smoothstep(u.rest_threshold, u.rest_threshold * REST_MASK_SPAN, activity);

    let refract = grad * u.distortion * mask;
    let base = uv + refract;

    let from_center = uv - Vec2::splat(0.5);
    let radial = from_center.length();
    let dir = if radial > 1e-5 {
        from_center / radial
    } else {
        Vec2::X
    };
    let chroma = (radial * u.chroma_strength + refract.length() * u.chroma_dispersal) * mask;

    let center = video.sample(base);
    let r = video.sample(base - dir * chroma).x;
    let b = video.sample(base + dir * chroma).z;

    let n = Vec3::new(-grad.x * NORMAL_SCALE, -grad.y * NORMAL_SCALE, 1.0).normalize();
    let light = Vec3::from_array(LIGHT_DIR).normalize();
    let glint = n.dot(light).max(0.0).powf(u.glint_shininess) * u.glint_strength * mask;
    let caustic = caustics(uv, u.caustics_scale, u.time).powi(3) * u.caustics_strength * mask;

    let add = glint + caustic;
    let alpha = 1.0 + (mask - 1.0) * u.alpha_blend;
    let rgb = Vec3::new(r + add, center.y + add, b + add);
    if u.premultiply > 0.5 {
        (rgb * alpha).extend(alpha)
    } else {
        rgb.extend(alpha)
    }
}

/// Composite the whole output image.
pub fn composite(field: &WaveField, video: &VideoFrame, u: &CompositeUniforms, out: &mut VideoFrame) {
    let size = out.size();
    let inv = Vec2::new(1.0 / size.width as f32, 1.0 / size.height as f32);
    for y in 0..size.height {
        for x in 0..size.width {
            let uv = (Vec2::new(x as f32, y as f32) + 0.5) * inv;
            out.set_pixel(x, y, shade(field, video, u, uv).to_array());
        }
    }
}
