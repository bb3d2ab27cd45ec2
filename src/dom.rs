use ripple_core::GridSize;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Match the canvas backing store to its CSS size times devicePixelRatio.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> GridSize {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
    canvas_size(canvas)
}

#[inline]
pub fn canvas_size(canvas: &web::HtmlCanvasElement) -> GridSize {
    GridSize::new(canvas.width(), canvas.height())
}

/// Show or hide the effect canvas. Hidden, it lets the video underneath show
/// through untouched.
pub fn set_canvas_visible(canvas: &web::HtmlCanvasElement, visible: bool) {
    let value = if visible { "visible" } else { "hidden" };
    if let Err(e) = canvas.style().set_property("visibility", value) {
        log::warn!("[dom] could not set canvas visibility: {:?}", e);
    }
}
