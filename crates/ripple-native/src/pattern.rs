use ripple_core::{GridSize, VideoFrame};
use ripple_gpu::{FrameSource, GpuTexture};

/// Animated colour bars standing in for a video element.
pub struct TestPattern {
    size: GridSize,
    bytes: Vec<u8>,
}

impl TestPattern {
    pub fn new(size: GridSize) -> Self {
        let mut pattern = Self {
            size,
            bytes: Vec::new(),
        };
        pattern.advance(0.0);
        pattern
    }

    /// Redraw the pattern for time `t` in seconds.
    pub fn advance(&mut self, t: f32) {
        let (w, h) = (self.size.width as f32, self.size.height as f32);
        let frame = VideoFrame::from_fn(self.size, |x, y| {
            let u = x as f32 / w;
            let v = y as f32 / h;
            let bar = ((u * 8.0 + t * 0.1).floor() as i32).rem_euclid(8);
            let checker = if ((x / 32) + (y / 32)) % 2 == 0 { 0.9 } else { 1.0 };
            let base = [
                (bar & 1) as f32,
                ((bar >> 1) & 1) as f32,
                ((bar >> 2) & 1) as f32,
            ];
            let shade = (0.35 + 0.65 * (1.0 - v)) * checker;
            [base[0] * shade, base[1] * shade, base[2] * shade, 1.0]
        });
        self.bytes = frame.to_rgba8();
    }
}

impl FrameSource for TestPattern {
    fn frame_size(&self) -> Option<GridSize> {
        Some(self.size)
    }

    fn upload(&self, queue: &wgpu::Queue, target: &GpuTexture) -> anyhow::Result<()> {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.bytes,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.size.width),
                rows_per_image: Some(self.size.height),
            },
            wgpu::Extent3d {
                width: self.size.width,
                height: self.size.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}
