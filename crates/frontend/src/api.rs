use std::cell::Cell;
use std::rc::Rc;

use heatmap_shared::models::{Feature, FeatureCollection};
use reqwest::Url;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum LoadError {
    /// The request could not complete, or the server answered with an error status.
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid heatmap document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        LoadError::Transport(e.to_string())
    }
}

/// Resolve `<base>/heatmap.json` for the page at `page_url`.
///
/// An empty base is the site root. A base starting with `.` is relative to the page's own
/// directory; any other base is a path from the site root or an absolute URL.
pub fn data_url(page_url: &str, base: &str) -> String {
    let base = base.trim_end_matches('/');
    let dir = if base.starts_with('.') || base.contains("://") {
        format!("{}/", base)
    } else if base.trim_start_matches('/').is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", base.trim_start_matches('/'))
    };
    match Url::parse(page_url).and_then(|page| page.join(&dir)?.join(config::DATA_FILE)) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::warn!(page_url, error = %e, "Cannot resolve heatmap URL against the page");
            format!("{}{}", dir, config::DATA_FILE)
        }
    }
}

fn page_href() -> String {
    web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default()
}

/// URL of the heatmap document for the running page.
pub fn heatmap_url() -> String {
    data_url(&page_href(), config::base_path())
}

/// Parse a heatmap document. A missing `features` key is an empty collection.
pub fn parse_collection(body: &str) -> Result<FeatureCollection, LoadError> {
    Ok(serde_json::from_str(body)?)
}

/// Issue one GET for the heatmap document and parse it.
pub async fn fetch_features(url: &str) -> Result<FeatureCollection, LoadError> {
    let body = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_collection(&body)
}

/// Set when the owning view is torn down; checked before committing a load result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Decide what a finished load does to the view state.
///
/// `Some(features)` replaces the state wholesale. Failures are logged once and leave the
/// state untouched, as does any result arriving after the view was torn down.
pub fn settle(
    result: Result<FeatureCollection, LoadError>,
    cancel: &CancelToken,
) -> Option<Vec<Feature>> {
    if cancel.is_cancelled() {
        tracing::debug!("Heatmap view torn down before load finished, dropping result");
        return None;
    }
    match result {
        Ok(collection) => {
            tracing::info!(features = collection.features.len(), "Loaded heatmap data");
            Some(collection.features)
        }
        Err(e) => {
            tracing::error!(error = %e, "Error fetching heatmap data");
            None
        }
    }
}
