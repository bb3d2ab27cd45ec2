use super::helpers;
use ripple_core::GridSize;

/// Simulation state: height in R, velocity in G.
pub(crate) const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Video texture format that pairs with the given surface format.
///
/// Sampling and writing must use the same encoding, or the video changes
/// brightness even where the water is at rest. An sRGB surface encodes on
/// write, so the video decodes on sample. A plain unorm surface (the only
/// kind a WebGPU canvas offers) takes the stored sRGB bytes through unchanged.
pub(crate) fn video_format_for(surface: wgpu::TextureFormat) -> wgpu::TextureFormat {
    if surface.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    }
}

/// A texture plus its default view.
///
/// Used both for the two state targets and for the video texture. Handed back
/// to the backend exactly once, which destroys the texture immediately instead
/// of waiting for the last reference to drop.
pub struct GpuTexture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    size: GridSize,
}

impl GpuTexture {
    pub(crate) fn state_target(device: &wgpu::Device, size: GridSize) -> Self {
        let (texture, view) = helpers::create_color_texture(
            device,
            "ripple_state",
            size,
            STATE_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        Self {
            texture,
            view,
            size,
        }
    }

    pub(crate) fn video(device: &wgpu::Device, size: GridSize, format: wgpu::TextureFormat) -> Self {
        // copy_external_image_to_texture needs RENDER_ATTACHMENT on the destination
        let (texture, view) = helpers::create_color_texture(
            device,
            "ripple_video",
            size,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        Self {
            texture,
            view,
            size,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub(crate) fn destroy(self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn srgb_surface_samples_decoded_video() {
        assert_eq!(video_format_for(F::Bgra8UnormSrgb), F::Rgba8UnormSrgb);
        assert_eq!(video_format_for(F::Rgba8UnormSrgb), F::Rgba8UnormSrgb);
    }

    #[test]
    fn canvas_surface_passes_encoded_video_through() {
        // the formats a WebGPU canvas reports
        for surface in [F::Bgra8Unorm, F::Rgba8Unorm, F::Rgba16Float] {
            assert_eq!(video_format_for(surface), F::Rgba8Unorm, "{surface:?}");
        }
    }
}
