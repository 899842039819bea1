//! Helpers that turn user input into the `(domain, page_url)` pair
//! expected by [`picscrape_core::ScrapeService::scrape`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use crate::fetcher::{DESKTOP_USER_AGENT, host_name};

/// Per-attempt timeout when probing for a working scheme.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Make sure `raw` carries a scheme.
///
/// Input that already starts with `http://` or `https://` is returned as is.
/// Otherwise `https://raw` and then `http://raw` are probed; the first one
/// answering `200 OK` wins. If neither does, `raw` is returned unchanged.
pub async fn ensure_protocol(raw: &str) -> String {
    ensure_protocol_with_timeout(raw, PROBE_TIMEOUT).await
}

pub async fn ensure_protocol_with_timeout(raw: &str, timeout: Duration) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }

    let client = match Client::builder()
        .user_agent(DESKTOP_USER_AGENT)
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Could not build probe client");
            return raw.to_string();
        }
    };

    for candidate in [format!("https://{raw}"), format!("http://{raw}")] {
        match client.get(&candidate).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!(url = %candidate, "Protocol probe succeeded");
                return candidate;
            }
            Ok(response) => {
                tracing::debug!(
                    url = %candidate,
                    status = %response.status(),
                    "Protocol probe rejected"
                );
            }
            Err(e) => {
                tracing::debug!(url = %candidate, error = %e, "Protocol probe failed");
            }
        }
    }

    raw.to_string()
}

/// Hostname of `url`, or an empty string if it cannot be parsed.
pub fn get_domain(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => host_name(&parsed).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(%url, error = %e, "Error parsing URL");
            String::new()
        }
    }
}
