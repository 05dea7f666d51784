use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use heatmap_shared::geo::{self, PlacedTile};
use heatmap_shared::marker::{band_counts, build_markers, Marker};
use heatmap_shared::models::{Feature, LatLng};

use crate::components::legend::Legend;
use crate::config;
use crate::coords;

const MAP_CONTAINER_ID: &str = "heatmap-container";

/// Drag threshold in pixels; movement below this is not treated as a pan.
const DRAG_THRESHOLD: f64 = 3.0;
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

/// A basemap tile ready for the DOM.
#[derive(Debug, Clone, PartialEq)]
struct TileImage {
    key: String,
    url: String,
    left: f64,
    top: f64,
}

fn tile_images(tiles: &[PlacedTile]) -> Vec<TileImage> {
    tiles
        .iter()
        .map(|t| TileImage {
            key: format!("{}/{}/{}", t.z, t.col, t.y),
            url: geo::tile_url(config::TILE_URL, &config::TILE_SUBDOMAINS, t),
            left: t.left,
            top: t.top,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

/// Escape text for use inside SVG markup.
fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the marker overlay as one SVG string, sized to the viewport.
fn build_marker_svg(
    markers: &[Marker],
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> String {
    let mut content = String::with_capacity(256 * markers.len() + 256);
    for marker in markers {
        let (x, y) = geo::screen_position(marker.position, center, zoom, viewport_w, viewport_h);
        build_marker(&mut content, marker, x, y);
    }
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{viewport_w}" height="{viewport_h}" viewBox="0 0 {viewport_w} {viewport_h}" style="position:absolute;top:0;left:0;pointer-events:none;z-index:5;">{content}</svg>"#
    )
}

fn build_marker(svg: &mut String, marker: &Marker, x: f64, y: f64) {
    let r = config::MARKER_RADIUS;
    let sw = config::MARKER_WEIGHT;
    let opacity = config::MARKER_FILL_OPACITY;
    let color = marker.color();
    let band = marker.band.label();
    let tooltip = escape_markup(&marker.tooltip);
    let label_y = y - r - 8.0;

    svg.push_str(&format!(
        r#"<g class="signal-marker {band}" tabindex="0" role="img" aria-label="{tooltip}" pointer-events="all"><title>{tooltip}</title>"#
    ));
    svg.push_str(&format!(
        r#"<circle cx="{x}" cy="{y}" r="{r}" stroke="{color}" stroke-width="{sw}" fill="{color}" fill-opacity="{opacity}"/>"#
    ));
    svg.push_str(&format!(
        r#"<text class="marker-tooltip" x="{x}" y="{label_y}" fill="white" font-size="13" font-family="sans-serif" font-weight="600" text-anchor="middle" stroke="rgba(0,0,0,0.75)" stroke-width="3" paint-order="stroke">{tooltip}</text>"#
    ));
    svg.push_str("</g>");
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Zoom level after one wheel notch, clamped to the tile source's range.
fn step_zoom(zoom: u8, delta_y: f64) -> u8 {
    if delta_y < 0.0 {
        zoom.saturating_add(1).min(config::MAX_ZOOM)
    } else if delta_y > 0.0 {
        zoom.saturating_sub(1).max(config::MIN_ZOOM)
    } else {
        zoom
    }
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Zoom level for a pinch that has spread the fingers from `start_distance` to `distance`.
/// Each doubling of the finger distance is one level.
fn pinch_zoom(start_zoom: u8, start_distance: f64, distance: f64) -> u8 {
    if start_distance < 1.0 || distance <= 0.0 {
        return start_zoom;
    }
    let steps = (distance / start_distance).log2().round();
    let target = (f64::from(start_zoom) + steps)
        .clamp(f64::from(config::MIN_ZOOM), f64::from(config::MAX_ZOOM));
    target as u8
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(features: Signal<Vec<Feature>>) -> Element {
    // View state is fixed at construction; only the user moves it afterwards.
    let mut center = use_signal(|| config::INITIAL_CENTER);
    let mut zoom = use_signal(|| config::INITIAL_ZOOM);
    let mut viewport = use_signal(|| coords::viewport_size(MAP_CONTAINER_ID));

    // Drag state
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_center = use_signal(|| config::INITIAL_CENTER);

    // Touch state
    let mut touch_start = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut is_pinching = use_signal(|| false);
    let mut pinch_start_distance = use_signal(|| 0.0_f64);
    let mut pinch_start_zoom = use_signal(|| config::INITIAL_ZOOM);
    let mut pinch_midpoint = use_signal(|| (0.0_f64, 0.0_f64));

    let markers = use_memo(move || build_markers(&features.read()));

    let svg_html = use_memo(move || {
        let (w, h) = *viewport.read();
        build_marker_svg(&markers.read(), *center.read(), *zoom.read(), w, h)
    });

    let tiles = use_memo(move || {
        let (w, h) = *viewport.read();
        tile_images(&geo::visible_tiles(*center.read(), *zoom.read(), w, h))
    });

    let counts = band_counts(&markers.read());
    let total = markers.read().len();
    let attribution_link = config::ATTRIBUTION_LINK_TEXT;
    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onresize: move |evt: Event<ResizeData>| {
                if let Ok(size) = evt.data().get_content_box_size() {
                    if size.width > 0.0 && size.height > 0.0 {
                        viewport.set((size.width, size.height));
                    }
                }
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let old_z = *zoom.read();
                let new_z = step_zoom(old_z, wheel_delta_y(evt.data().delta()));
                if new_z == old_z {
                    return;
                }
                let client = evt.data().client_coordinates();
                let (off_x, off_y) = coords::offset_from_center(client.x, client.y, MAP_CONTAINER_ID)
                    .unwrap_or((0.0, 0.0));
                let next = geo::zoom_center_at(*center.read(), old_z, new_z, off_x, off_y);
                center.set(next);
                zoom.set(new_z);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_center.set(*center.read());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.read();
                let dx = client.x - sx;
                let dy = client.y - sy;
                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let next = geo::pan_center(*drag_start_center.read(), *zoom.read(), dx, dy);
                    center.set(next);
                }
            },

            onmouseup: move |_| {
                is_dragging.set(false);
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                center.set(config::INITIAL_CENTER);
                zoom.set(config::INITIAL_ZOOM);
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let points: Vec<(f64, f64)> = evt
                    .data()
                    .touches()
                    .iter()
                    .map(|t| (t.client_coordinates().x, t.client_coordinates().y))
                    .collect();
                match points.as_slice() {
                    [single] => {
                        touch_start.set(Some(*single));
                        touch_did_pan.set(false);
                        drag_start_center.set(*center.read());
                    }
                    [p0, p1, ..] => {
                        // Two fingers: pinch around their midpoint
                        is_pinching.set(true);
                        pinch_start_distance.set(point_distance(*p0, *p1));
                        pinch_start_zoom.set(*zoom.read());
                        pinch_midpoint.set(((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0));
                        drag_start_center.set(*center.read());
                        touch_start.set(None);
                        touch_did_pan.set(true);
                    }
                    [] => {}
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let points: Vec<(f64, f64)> = evt
                    .data()
                    .touches()
                    .iter()
                    .map(|t| (t.client_coordinates().x, t.client_coordinates().y))
                    .collect();
                match points.as_slice() {
                    [p0, p1, ..] if *is_pinching.read() => {
                        let start_z = *pinch_start_zoom.read();
                        let new_z = pinch_zoom(start_z, *pinch_start_distance.read(), point_distance(*p0, *p1));
                        if new_z == *zoom.read() {
                            return;
                        }
                        let (mx, my) = *pinch_midpoint.read();
                        let (off_x, off_y) = coords::offset_from_center(mx, my, MAP_CONTAINER_ID)
                            .unwrap_or((0.0, 0.0));
                        let next = geo::zoom_center_at(*drag_start_center.read(), start_z, new_z, off_x, off_y);
                        center.set(next);
                        zoom.set(new_z);
                    }
                    [cur] => {
                        let Some(start) = *touch_start.read() else { return };
                        if !*touch_did_pan.read() && point_distance(start, *cur) > TOUCH_DRAG_THRESHOLD {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.read() {
                            let next = geo::pan_center(
                                *drag_start_center.read(),
                                *zoom.read(),
                                cur.0 - start.0,
                                cur.1 - start.1,
                            );
                            center.set(next);
                        }
                    }
                    _ => {}
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                // Wait for every finger to lift before leaving a gesture
                if evt.data().touches().is_empty() {
                    is_pinching.set(false);
                    touch_start.set(None);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch_start.set(None);
                touch_did_pan.set(false);
                is_pinching.set(false);
            },

            div { class: "tile-layer",
                for tile in tiles.read().iter() {
                    img {
                        key: "{tile.key}",
                        class: "map-tile",
                        src: "{tile.url}",
                        alt: "",
                        draggable: "false",
                        style: "left:{tile.left}px;top:{tile.top}px;",
                    }
                }
            }

            div {
                class: "marker-layer",
                dangerous_inner_html: "{svg_html}",
            }

            Legend { counts: counts, total: total }

            div { class: "attribution",
                "© "
                a { href: config::ATTRIBUTION_URL, target: "_blank", rel: "noopener", "{attribution_link}" }
                " contributors"
            }
        }
    }
}
