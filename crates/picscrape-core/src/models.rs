use std::fmt;

use crate::error::AppError;

/// Maximum number of image URLs returned by a single scrape.
pub const MAX_IMAGES: usize = 500;

/// The page to scrape and the single host the fetch is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    /// Hostname, e.g. `"example.com"`.
    pub domain: String,
    /// Absolute page URL including scheme.
    pub page_url: String,
}

impl TargetSpec {
    pub fn new(domain: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            page_url: page_url.into(),
        }
    }

    /// Protocol used when resolving references found on this page.
    pub fn protocol(&self) -> Protocol {
        Protocol::from_page_url(&self.page_url)
    }
}

/// Scheme prepended to resolved image references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// `Https` when the page URL starts with `https`, otherwise `Http`.
    pub fn from_page_url(page_url: &str) -> Self {
        if page_url.starts_with("https") {
            Protocol::Https
        } else {
            Protocol::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a scrape: the image URLs collected so far, plus the fetch error
/// if one occurred. Both may be present at once.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub images: Vec<String>,
    pub error: Option<AppError>,
}

impl ScrapeOutcome {
    pub fn ok(images: Vec<String>) -> Self {
        Self {
            images,
            error: None,
        }
    }

    pub fn failed(images: Vec<String>, error: AppError) -> Self {
        Self {
            images,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
