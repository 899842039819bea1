use crate::config::ScrapeConfig;
use crate::dedup::dedupe;
use crate::models::{Protocol, ScrapeOutcome, TargetSpec};
use crate::traits::{Fetcher, Scanner};

/// Orchestrates the scrape pipeline: fetch → scan → dedupe → cap.
///
/// Generic over the fetcher and scanner so the pipeline can be tested
/// without network access.
pub struct ScrapeService<F, S>
where
    F: Fetcher,
    S: Scanner,
{
    fetcher: F,
    scanner: S,
    config: ScrapeConfig,
}

impl<F, S> ScrapeService<F, S>
where
    F: Fetcher,
    S: Scanner,
{
    /// Create a service with the default 500-image cap.
    pub fn new(fetcher: F, scanner: S) -> Self {
        Self::with_config(fetcher, scanner, ScrapeConfig::default())
    }

    pub fn with_config(fetcher: F, scanner: S, config: ScrapeConfig) -> Self {
        Self {
            fetcher,
            scanner,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Collect the image URLs referenced by `page_url`, fetching only from `domain`.
    ///
    /// On a fetch error the partial (pre-dedupe) candidates are returned
    /// alongside the error. The cap is checked once before the fetch; the
    /// scan itself may overshoot, and the deduplicated result is truncated
    /// to `max_images` before returning.
    pub async fn scrape(&self, domain: &str, page_url: &str) -> ScrapeOutcome {
        let protocol = Protocol::from_page_url(page_url);
        let mut candidates: Vec<String> = Vec::new();

        if candidates.len() >= self.config.max_images {
            tracing::debug!(cap = self.config.max_images, "Cap reached before fetch");
            return ScrapeOutcome::ok(candidates);
        }

        tracing::info!("Visiting {}", page_url);
        let html = match self.fetcher.fetch(page_url, domain).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %page_url, error = %e, "Page fetch failed");
                return ScrapeOutcome::failed(candidates, e);
            }
        };
        tracing::debug!("Fetched {} bytes of HTML", html.len());

        candidates.extend(self.scanner.scan(&html, domain, protocol));
        let scanned = candidates.len();

        let mut images = dedupe(candidates);
        if images.len() > self.config.max_images {
            tracing::info!(
                found = images.len(),
                cap = self.config.max_images,
                "Truncating to image cap"
            );
            images.truncate(self.config.max_images);
        }

        tracing::info!(
            candidates = scanned,
            unique = images.len(),
            "Found {} pictures",
            images.len()
        );

        ScrapeOutcome::ok(images)
    }

    /// Convenience wrapper taking a [`TargetSpec`].
    pub async fn scrape_target(&self, target: &TargetSpec) -> ScrapeOutcome {
        self.scrape(&target.domain, &target.page_url).await
    }
}
