use crate::constants::{HAVE_CURRENT_DATA, SAME_ORIGIN_SCHEMES, VIDEO_READY_EVENT};
use crate::events::Listener;
use ripple_core::{GridSize, ReadySignal};
use ripple_gpu::{FrameSource, GpuTexture};
use web_sys as web;

/// An HTML video element as the effect's frame source.
///
/// Nothing is uploaded until the element has decoded its first frame. That
/// moment is observed once through `loadeddata` rather than polled.
pub struct VideoSurface {
    element: web::HtmlVideoElement,
    ready: ReadySignal,
}

impl VideoSurface {
    /// Wrap `element`. The returned listener must live as long as the signal
    /// may still fire; it is `None` when the video is already decoded.
    pub fn new(element: web::HtmlVideoElement) -> (Self, Option<Listener>) {
        let ready = ReadySignal::new();
        if element.ready_state() >= HAVE_CURRENT_DATA {
            ready.fire();
            log::info!("[video] already decoded");
            return (Self { element, ready }, None);
        }
        let signal = ready.clone();
        let listener = Listener::new(&element, VIDEO_READY_EVENT, move |_: web::Event| {
            if signal.fire() {
                log::info!("[video] first frame decoded");
            }
        });
        (Self { element, ready }, Some(listener))
    }

    pub fn ready(&self) -> &ReadySignal {
        &self.ready
    }

    /// Fail unless the GPU may read this element's frames.
    ///
    /// A cross-origin video fetched without CORS taints its frames and the
    /// external image copy would throw. With a `crossorigin` attribute the
    /// browser refuses to decode a non-CORS response at all, so such an
    /// element never reports a frame.
    fn check_readable(&self) -> anyhow::Result<()> {
        let src = self.element.current_src();
        if src.is_empty() {
            anyhow::bail!("video has no source");
        }
        if self.element.cross_origin().is_some() {
            return Ok(());
        }
        let page = web::window()
            .ok_or_else(|| anyhow::anyhow!("no window"))?
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let url = web::Url::new_with_base(&src, &page).map_err(|e| anyhow::anyhow!("{:?}", e))?;
        if SAME_ORIGIN_SCHEMES.contains(&url.protocol().as_str()) || url.origin() == page {
            return Ok(());
        }
        anyhow::bail!("cross-origin video {} has no crossorigin attribute", url.origin())
    }
}

impl FrameSource for VideoSurface {
    fn frame_size(&self) -> Option<GridSize> {
        if !self.ready.is_ready() || self.element.ready_state() < HAVE_CURRENT_DATA {
            return None;
        }
        let (w, h) = (self.element.video_width(), self.element.video_height());
        (w > 0 && h > 0).then(|| GridSize::new(w, h))
    }

    fn upload(&self, queue: &wgpu::Queue, target: &GpuTexture) -> anyhow::Result<()> {
        self.check_readable()?;
        let size = target.size();
        queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::HTMLVideoElement(self.element.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}
