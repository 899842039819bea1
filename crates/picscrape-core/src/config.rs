use std::time::Duration;

use crate::error::AppError;
use crate::models::MAX_IMAGES;

/// Tunables for a scrape run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Upper bound on returned image URLs.
    pub max_images: usize,
    /// Timeout for the page request.
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ScrapeConfig {
    /// Read configuration from environment variables.
    ///
    /// - `PICSCRAPE_MAX_IMAGES` (optional, defaults to 500)
    /// - `PICSCRAPE_TIMEOUT_SECS` (optional, defaults to 30)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let max_images = match lookup("PICSCRAPE_MAX_IMAGES") {
            None => defaults.max_images,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid PICSCRAPE_MAX_IMAGES '{raw}': must be a non-negative integer"
                ))
            })?,
        };

        let timeout = match lookup("PICSCRAPE_TIMEOUT_SECS") {
            None => defaults.timeout,
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid PICSCRAPE_TIMEOUT_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if secs == 0 {
                    return Err(AppError::ConfigError(
                        "PICSCRAPE_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            max_images,
            timeout,
        })
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
