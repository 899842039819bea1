use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use picscrape_core::error::AppError;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::fetcher::{DESKTOP_USER_AGENT, request_error};

/// File name used when none can be derived from the URL.
pub const FALLBACK_FILE_NAME: &str = "unknown.jpg";

/// Default number of images downloaded in parallel.
pub const DEFAULT_CONCURRENCY: usize = 4;

#[cfg(unix)]
const DOWNLOAD_MODE: u32 = 0o665;

/// Outcome of downloading one image.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DownloadReport {
    pub url: String,
    pub path: Option<PathBuf>,
    pub bytes: Option<u64>,
    pub error: Option<String>,
}

impl DownloadReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Saves image URLs to local files.
///
/// Unlike the page fetcher this is not domain-restricted: images commonly
/// live on CDNs. Batch downloads run at most `concurrency` requests at once.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    timeout_secs: u64,
    concurrency: usize,
}

impl Downloader {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: timeout.as_secs(),
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Limit the number of parallel downloads (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Download one image to `path`. Returns the number of bytes written.
    pub async fn download_image(&self, url: &str, path: &Path) -> Result<u64, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout_secs))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpError(format!(
                "failed to download image: {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read image body: {e}")))?;
        tokio::fs::write(path, &body).await?;
        set_download_permissions(path).await;

        tracing::debug!(%url, path = %path.display(), bytes = body.len(), "Saved image");
        Ok(body.len() as u64)
    }

    /// Download every URL into `dir`, continuing past individual failures.
    ///
    /// Reports come back in input order. File names are taken from the last
    /// path segment; clashing names get a numeric suffix.
    pub async fn download_all(&self, urls: &[String], dir: &Path) -> Vec<DownloadReport> {
        let names = unique_file_names(urls);

        let reports: Vec<DownloadReport> = futures::stream::iter(urls.iter().zip(names))
            .map(|(url, name)| async move {
                if let Err(e) = Url::parse(url) {
                    tracing::warn!(%url, error = %e, "Failed to parse URL");
                    return DownloadReport {
                        url: url.clone(),
                        path: None,
                        bytes: None,
                        error: Some(AppError::InvalidUrl(format!("{url}: {e}")).to_string()),
                    };
                }

                let path = dir.join(name);
                match self.download_image(url, &path).await {
                    Ok(bytes) => DownloadReport {
                        url: url.clone(),
                        path: Some(path),
                        bytes: Some(bytes),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(%url, error = %e, "Failed to download image");
                        DownloadReport {
                            url: url.clone(),
                            path: None,
                            bytes: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let saved = reports.iter().filter(|r| r.is_ok()).count();
        tracing::info!(saved, total = reports.len(), dir = %dir.display(), "Download finished");
        reports
    }
}

/// Suggested file name for an image URL: the last path segment, or
/// [`FALLBACK_FILE_NAME`] if there is none.
pub fn file_name_for(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_FILE_NAME.to_string();
    };

    match parsed.path().trim_end_matches('/').rsplit('/').next() {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name.to_string(),
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}

/// File names for a batch, with `-1`, `-2`, ... appended to repeats.
fn unique_file_names(urls: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    urls.iter()
        .map(|url| {
            let name = file_name_for(url);
            if used.insert(name.clone()) {
                return name;
            }
            let (stem, ext) = match name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{ext}")),
                _ => (name.clone(), String::new()),
            };
            (1..)
                .map(|n| format!("{stem}-{n}{ext}"))
                .find(|candidate| used.insert(candidate.clone()))
                .unwrap_or(name)
        })
        .collect()
}

#[cfg(unix)]
async fn set_download_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let perms = std::fs::Permissions::from_mode(DOWNLOAD_MODE);
    if let Err(e) = tokio::fs::set_permissions(path, perms).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to set file permissions");
    }
}

#[cfg(not(unix))]
async fn set_download_permissions(_path: &Path) {}
