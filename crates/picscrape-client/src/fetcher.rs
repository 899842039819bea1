use std::time::Duration;

use picscrape_core::config::ScrapeConfig;
use picscrape_core::error::AppError;
use picscrape_core::traits::Fetcher;
use reqwest::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use url::{Host, Url};

/// Desktop browser User-Agent sent with every request; some sites refuse
/// obvious bot agents.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.140 Safari/537.36 Edge/17.17134";

/// Maximum number of redirect hops followed for one page request.
const MAX_REDIRECTS: usize = 10;

/// HTTP fetcher using reqwest, restricted to a single allowed domain.
///
/// Redirects are followed by hand so that every hop can be checked against
/// the allowed domain; a hop to any other host fails with
/// [`AppError::DomainNotAllowed`]. Requests are never retried.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self, AppError> {
        Self::with_timeout(config.timeout)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        let timeout_secs = timeout.as_secs();
        let client = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs,
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, allowed_domain: &str) -> Result<String, AppError> {
        let mut current = Url::parse(url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;
        check_scheme(&current)?;
        check_domain(&current, allowed_domain)?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| request_error(e, self.timeout_secs))?;

            let status = response.status();
            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        AppError::HttpError(format!(
                            "HTTP {} without Location header for {}",
                            status.as_u16(),
                            current
                        ))
                    })?;
                let next = current
                    .join(location)
                    .map_err(|e| AppError::InvalidUrl(format!("{location}: {e}")))?;
                tracing::debug!(from = %current, to = %next, "Following redirect");
                check_scheme(&next)?;
                check_domain(&next, allowed_domain)?;
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(AppError::HttpError(format!(
                    "HTTP {} for {}",
                    status.as_u16(),
                    current
                )));
            }

            return response
                .text()
                .await
                .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")));
        }

        Err(AppError::HttpError(format!(
            "Stopped after {MAX_REDIRECTS} redirects for {url}"
        )))
    }
}

/// Hostname of a URL, with IPv6 brackets removed.
pub(crate) fn host_name(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => Some(domain.to_string()),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Map a reqwest send error onto the error taxonomy.
pub(crate) fn request_error(e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

fn check_scheme(url: &Url) -> Result<(), AppError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::InvalidUrl(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}

fn check_domain(url: &Url, allowed_domain: &str) -> Result<(), AppError> {
    match host_name(url) {
        Some(host) if !allowed_domain.is_empty() && host.eq_ignore_ascii_case(allowed_domain) => {
            Ok(())
        }
        _ => Err(AppError::DomainNotAllowed {
            url: url.to_string(),
            domain: allowed_domain.to_string(),
        }),
    }
}
