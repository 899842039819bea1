//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::Protocol;
use crate::traits::{Fetcher, Scanner};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Recorded fetch call: (url, allowed_domain).
pub type FetchRecord = (String, String);

/// Mock fetcher that returns a configurable response.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default HTML string.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    pub requests: Arc<Mutex<Vec<FetchRecord>>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, allowed_domain: &str) -> Result<String, AppError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), allowed_domain.to_string()));

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok("<html><body>default</body></html>".to_string())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockScanner
// ---------------------------------------------------------------------------

/// Recorded scan call: (html, domain, protocol).
pub type ScanRecord = (String, String, Protocol);

/// Mock scanner that ignores the markup and returns fixed candidates.
#[derive(Clone)]
pub struct MockScanner {
    candidates: Vec<String>,
    pub calls: Arc<Mutex<Vec<ScanRecord>>>,
}

impl MockScanner {
    pub fn new(candidates: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Scanner for MockScanner {
    fn scan(&self, html: &str, domain: &str, protocol: Protocol) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .push((html.to_string(), domain.to_string(), protocol));
        self.candidates.clone()
    }
}
