//! Bounded cache of loaded images for the display layer.
//!
//! Keyed by URL, weighed by body size, evicted by moka's TinyLFU policy once
//! the byte budget is exceeded. Failed loads are not cached, so a later call
//! retries them.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use picscrape_core::error::AppError;
use picscrape_core::filter::is_gif;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};

use crate::fetcher::{DESKTOP_USER_AGENT, request_error};

/// Default byte budget for cached image bodies (64 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Timeout for loading a single image.
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// An image body held in memory.
#[derive(Debug)]
pub struct LoadedImage {
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl LoadedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Image bodies keyed by URL, bounded by their total size in bytes.
///
/// Clones share the same entries.
#[derive(Clone)]
pub struct ImageCache {
    client: Client,
    cache: Cache<String, Arc<LoadedImage>>,
}

impl ImageCache {
    pub fn new() -> Result<Self, AppError> {
        Self::with_max_bytes(DEFAULT_MAX_BYTES)
    }

    pub fn with_max_bytes(max_bytes: u64) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(LOAD_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        let cache = Cache::builder()
            .max_capacity(max_bytes)
            .weigher(|_url: &String, image: &Arc<LoadedImage>| -> u32 {
                image.len().try_into().unwrap_or(u32::MAX)
            })
            .build();

        Ok(Self { client, cache })
    }

    /// Return the cached image for `url`, loading it on a miss.
    ///
    /// Concurrent calls for the same URL share a single request.
    pub async fn get_or_load(&self, url: &str) -> Result<Arc<LoadedImage>, Arc<AppError>> {
        self.cache
            .try_get_with(url.to_string(), self.load(url))
            .await
    }

    pub fn contains(&self, url: &str) -> bool {
        self.cache.contains_key(url)
    }

    /// Total size in bytes of the cached bodies, as of the last maintenance run.
    pub fn weighted_size(&self) -> u64 {
        self.cache.weighted_size()
    }

    /// Apply pending inserts and evictions now instead of lazily.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    async fn load(&self, url: &str) -> Result<Arc<LoadedImage>, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e, LOAD_TIMEOUT.as_secs()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpError(format!(
                "HTTP request failed with status code {}",
                status.as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // GIFs go through a frame decoder downstream that needs the real thing.
        if is_gif(url) {
            let media_type = content_type
                .as_deref()
                .and_then(|ct| ct.split(';').next())
                .map(str::trim)
                .unwrap_or_default();
            if !media_type.eq_ignore_ascii_case("image/gif") {
                return Err(AppError::HttpError(format!(
                    "expected image/gif content type, got {}",
                    content_type.as_deref().unwrap_or("none")
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read image body: {e}")))?;

        tracing::debug!(%url, bytes = bytes.len(), "Loaded image");
        Ok(Arc::new(LoadedImage {
            url: url.to_string(),
            content_type,
            bytes: bytes.to_vec(),
        }))
    }
}
