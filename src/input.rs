use glam::Vec2;
use ripple_core::normalize_in_rect;
use web_sys as web;

/// Pointer position in canvas uv space, or `None` outside the canvas.
#[inline]
pub fn pointer_uv(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Option<Vec2> {
    let rect = canvas.get_bounding_client_rect();
    normalize_in_rect(
        Vec2::new(ev.client_x() as f32, ev.client_y() as f32),
        Vec2::new(rect.left() as f32, rect.top() as f32),
        Vec2::new(rect.width() as f32, rect.height() as f32),
    )
}
