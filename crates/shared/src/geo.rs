//! Spherical Web Mercator projection and slippy-map tile math.
//!
//! World pixel space at zoom `z` is a square of `TILE_SIZE * 2^z` pixels with the
//! origin at the north-west corner (lng -180, lat ~85.05).

use crate::models::LatLng;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Side length of the world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

/// Number of tiles along one axis at `zoom`.
pub fn tile_count(zoom: u8) -> i64 {
    1i64 << zoom.min(30)
}

/// Project a geographic position to world pixel coordinates.
pub fn project(pos: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = pos.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (pos.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / size);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Position of `pos` relative to the top-left corner of a viewport centered on `center`.
pub fn screen_position(
    pos: LatLng,
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> (f64, f64) {
    let (px, py) = project(pos, zoom);
    let (cx, cy) = project(center, zoom);
    (px - cx + viewport_w / 2.0, py - cy + viewport_h / 2.0)
}

/// New center after dragging the map by `(dx, dy)` screen pixels.
pub fn pan_center(center: LatLng, zoom: u8, dx: f64, dy: f64) -> LatLng {
    let (cx, cy) = project(center, zoom);
    let size = world_size(zoom);
    let new_y = (cy - dy).clamp(0.0, size);
    let mut moved = unproject(cx - dx, new_y, zoom);
    moved.lng = wrap_lng(moved.lng);
    moved
}

/// New center that keeps the geographic point under `(offset_x, offset_y)` fixed while
/// switching from `old_zoom` to `new_zoom`. Offsets are relative to the viewport center.
pub fn zoom_center_at(
    center: LatLng,
    old_zoom: u8,
    new_zoom: u8,
    offset_x: f64,
    offset_y: f64,
) -> LatLng {
    let (cx, cy) = project(center, old_zoom);
    let anchor = unproject(cx + offset_x, cy + offset_y, old_zoom);
    let (ax, ay) = project(anchor, new_zoom);
    let mut moved = unproject(ax - offset_x, ay - offset_y, new_zoom);
    moved.lng = wrap_lng(moved.lng);
    moved
}

fn wrap_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped.is_finite() {
        wrapped
    } else {
        0.0
    }
}

/// A tile to draw, with its screen offset from the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    /// Column before wrapping; unique among the tiles of one view, unlike `x`.
    pub col: i64,
    pub x: i64,
    pub y: i64,
    pub z: u8,
    pub left: f64,
    pub top: f64,
}

/// Tiles covering a `viewport_w x viewport_h` viewport centered on `center`.
///
/// Columns wrap across the antimeridian; rows outside the world are skipped.
pub fn visible_tiles(
    center: LatLng,
    zoom: u8,
    viewport_w: f64,
    viewport_h: f64,
) -> Vec<PlacedTile> {
    if viewport_w <= 0.0 || viewport_h <= 0.0 {
        return Vec::new();
    }
    let (cx, cy) = project(center, zoom);
    let origin_x = cx - viewport_w / 2.0;
    let origin_y = cy - viewport_h / 2.0;

    let first_col = (origin_x / TILE_SIZE).floor() as i64;
    let last_col = ((origin_x + viewport_w) / TILE_SIZE).ceil() as i64 - 1;
    let first_row = (origin_y / TILE_SIZE).floor() as i64;
    let last_row = ((origin_y + viewport_h) / TILE_SIZE).ceil() as i64 - 1;

    let n = tile_count(zoom);
    let mut tiles = Vec::new();
    for row in first_row.max(0)..=last_row.min(n - 1) {
        for col in first_col..=last_col {
            tiles.push(PlacedTile {
                col,
                x: col.rem_euclid(n),
                y: row,
                z: zoom,
                left: col as f64 * TILE_SIZE - origin_x,
                top: row as f64 * TILE_SIZE - origin_y,
            });
        }
    }
    tiles
}

/// Expand a `{s}/{z}/{x}/{y}` URL template for one tile.
pub fn tile_url(template: &str, subdomains: &[&str], tile: &PlacedTile) -> String {
    let subdomain = if subdomains.is_empty() {
        ""
    } else {
        let idx = (tile.x + tile.y).unsigned_abs() as usize % subdomains.len();
        subdomains.get(idx).copied().unwrap_or("")
    };
    template
        .replace("{s}", subdomain)
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OSM: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

    #[test]
    fn test_project_origin_is_world_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_project_corners() {
        let (x, y) = project(LatLng::new(MAX_LATITUDE, -180.0), 1);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        let (x, y) = project(LatLng::new(-MAX_LATITUDE, 180.0), 1);
        assert!((x - 512.0).abs() < 1e-6);
        assert!((y - 512.0).abs() < 1e-6);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let pos = LatLng::new(-19.9, -43.9);
        let (x, y) = project(pos, 12);
        let back = unproject(x, y, 12);
        assert!((back.lat - pos.lat).abs() < 1e-9);
        assert!((back.lng - pos.lng).abs() < 1e-9);
    }

    #[test]
    fn test_project_known_tile() {
        // Belo Horizonte at zoom 12 falls in tile (1548, 2279).
        let (x, y) = project(LatLng::new(-19.9, -43.9), 12);
        assert_eq!((x / TILE_SIZE).floor() as i64, 1548);
        assert_eq!((y / TILE_SIZE).floor() as i64, 2279);
    }

    #[test]
    fn test_screen_position_center_is_viewport_middle() {
        let center = LatLng::new(-19.9, -43.9);
        let (x, y) = screen_position(center, center, 12, 800.0, 600.0);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_position_east_is_right_north_is_up() {
        let center = LatLng::new(-19.9, -43.9);
        let (x, y) = screen_position(LatLng::new(-19.8, -43.8), center, 12, 800.0, 600.0);
        assert!(x > 400.0);
        assert!(y < 300.0);
    }

    #[test]
    fn test_pan_center_moves_opposite_to_drag() {
        let center = LatLng::new(-19.9, -43.9);
        // Dragging the map to the right reveals what is west of the center.
        let moved = pan_center(center, 12, 100.0, 0.0);
        assert!(moved.lng < center.lng);
        assert!((moved.lat - center.lat).abs() < 1e-9);
    }

    #[test]
    fn test_pan_center_wraps_longitude() {
        let moved = pan_center(LatLng::new(0.0, 179.9), 2, -200.0, 0.0);
        assert!(moved.lng >= -180.0 && moved.lng < 180.0);
    }

    #[test]
    fn test_zoom_center_at_keeps_center_when_offset_zero() {
        let center = LatLng::new(-19.9, -43.9);
        let moved = zoom_center_at(center, 12, 13, 0.0, 0.0);
        assert!((moved.lat - center.lat).abs() < 1e-9);
        assert!((moved.lng - center.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_center_at_keeps_anchor_fixed() {
        let center = LatLng::new(-19.9, -43.9);
        let (ox, oy) = (150.0, -80.0);
        let (cx, cy) = project(center, 12);
        let anchor = unproject(cx + ox, cy + oy, 12);

        let moved = zoom_center_at(center, 12, 13, ox, oy);
        let (sx, sy) = screen_position(anchor, moved, 13, 800.0, 600.0);
        assert!((sx - (400.0 + ox)).abs() < 1e-6);
        assert!((sy - (300.0 + oy)).abs() < 1e-6);
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let tiles = visible_tiles(LatLng::new(-19.9, -43.9), 12, 800.0, 600.0);
        assert!(!tiles.is_empty());
        // Every viewport pixel corner is covered by some tile.
        for (px, py) in [(0.0, 0.0), (799.0, 0.0), (0.0, 599.0), (799.0, 599.0)] {
            assert!(tiles.iter().any(|t| {
                px >= t.left && px < t.left + TILE_SIZE && py >= t.top && py < t.top + TILE_SIZE
            }));
        }
        // At most one extra row/column on each axis.
        assert!(tiles.len() <= 5 * 4);
    }

    #[test]
    fn test_visible_tiles_skip_rows_outside_world() {
        // Zoom 0 is a single tile; a tall viewport still yields only that row.
        let tiles = visible_tiles(LatLng::new(0.0, 0.0), 0, 200.0, 2000.0);
        assert!(tiles.iter().all(|t| t.y == 0));
    }

    #[test]
    fn test_visible_tiles_wrap_columns() {
        let tiles = visible_tiles(LatLng::new(0.0, 0.0), 0, 1000.0, 256.0);
        assert!(tiles.len() > 1);
        assert!(tiles.iter().all(|t| t.x == 0));
    }

    #[test]
    fn test_visible_tiles_positions_unique_when_zoomed_out() {
        for zoom in 0..=3 {
            let tiles = visible_tiles(LatLng::new(-19.9, -43.9), zoom, 1920.0, 1080.0);
            let mut seen = std::collections::HashSet::new();
            for t in &tiles {
                assert!(seen.insert((t.col, t.y)), "zoom {zoom}: repeated tile {t:?}");
            }
            // Wrapped copies share a source tile but sit side by side.
            assert!(tiles.iter().any(|t| t.col != t.x));
        }
    }

    #[test]
    fn test_visible_tiles_empty_viewport() {
        assert!(visible_tiles(LatLng::new(0.0, 0.0), 3, 0.0, 600.0).is_empty());
    }

    #[test]
    fn test_tile_url_substitutes_template() {
        let tile = PlacedTile { col: 1548, x: 1548, y: 2279, z: 12, left: 0.0, top: 0.0 };
        let url = tile_url(OSM, &["a", "b", "c"], &tile);
        // (1548 + 2279) % 3 == 2
        assert_eq!(url, "https://c.tile.openstreetmap.org/12/1548/2279.png");
    }

    #[test]
    fn test_tile_url_without_subdomains() {
        let tile = PlacedTile { col: -1, x: 0, y: 0, z: 0, left: 0.0, top: 0.0 };
        assert_eq!(
            tile_url("https://tiles.example/{z}/{x}/{y}.png", &[], &tile),
            "https://tiles.example/0/0/0.png"
        );
    }
}
