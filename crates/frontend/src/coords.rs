use crate::config;

/// Pure function: offset of a client (viewport) point from the center of a rect.
/// Usable in unit tests (no web_sys dependency).
pub fn offset_from_rect_center(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
    rect_w: f64,
    rect_h: f64,
) -> (f64, f64) {
    (
        client_x - rect_left - rect_w / 2.0,
        client_y - rect_top - rect_h / 2.0,
    )
}

/// Pick the first measured size with both sides positive, else the fallback.
pub fn usable_size(candidates: &[Option<(f64, f64)>]) -> (f64, f64) {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|&(w, h)| w > 0.0 && h > 0.0)
        .unwrap_or(config::FALLBACK_VIEWPORT)
}

fn container_rect(container_id: &str) -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    Some(element.get_bounding_client_rect())
}

fn window_size() -> Option<(f64, f64)> {
    let window = web_sys::window()?;
    let w = window.inner_width().ok()?.as_f64()?;
    let h = window.inner_height().ok()?.as_f64()?;
    Some((w, h))
}

/// Current size of the map container. Before it is mounted the map fills the window,
/// so the window's inner size stands in for it.
pub fn viewport_size(container_id: &str) -> (f64, f64) {
    let container = container_rect(container_id).map(|r| (r.width(), r.height()));
    usable_size(&[container, window_size()])
}

/// Offset of a client point from the center of the map container.
pub fn offset_from_center(client_x: f64, client_y: f64, container_id: &str) -> Option<(f64, f64)> {
    let rect = container_rect(container_id)?;
    Some(offset_from_rect_center(
        client_x,
        client_y,
        rect.left(),
        rect.top(),
        rect.width(),
        rect.height(),
    ))
}
