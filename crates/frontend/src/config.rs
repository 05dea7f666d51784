use heatmap_shared::models::LatLng;

/// Base path the app is deployed under, baked in at build time.
///
/// Empty means the site root. Set `HEATMAP_BASE_PATH=/some/prefix` when building for a
/// sub-path deployment, `./` to load data next to the page, or an absolute `https://…` URL
/// to load data from another host.
pub fn base_path() -> &'static str {
    option_env!("HEATMAP_BASE_PATH").unwrap_or("")
}

pub const DATA_FILE: &str = "heatmap.json";

// Basemap
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
pub const ATTRIBUTION_URL: &str = "https://www.openstreetmap.org/copyright";
pub const ATTRIBUTION_LINK_TEXT: &str = "OpenStreetMap";

// Initial view
pub const INITIAL_CENTER: LatLng = LatLng::new(-19.9, -43.9);
pub const INITIAL_ZOOM: u8 = 12;
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 19;

// Markers
pub const MARKER_RADIUS: f64 = 8.0;
pub const MARKER_WEIGHT: f64 = 2.0;
pub const MARKER_FILL_OPACITY: f64 = 0.8;

/// Viewport used before the container has been measured.
pub const FALLBACK_VIEWPORT: (f64, f64) = (1024.0, 768.0);
