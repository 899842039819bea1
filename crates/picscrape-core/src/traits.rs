use std::future::Future;

use crate::error::AppError;
use crate::models::Protocol;

/// Fetches the raw HTML of a single page.
///
/// Implementations must refuse any request (including redirect hops) whose
/// host is not exactly `allowed_domain`.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        url: &str,
        allowed_domain: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Scans page markup for image references and resolves them.
///
/// Returns candidates in document order, before deduplication. Malformed
/// or missing attributes are skipped rather than reported.
pub trait Scanner: Send + Sync + Clone {
    fn scan(&self, html: &str, domain: &str, protocol: Protocol) -> Vec<String>;
}
