use thiserror::Error;

/// Application-wide error types for picscrape.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The request targeted a host other than the allowed domain.
    #[error("Forbidden domain: {url} is outside allowed domain '{domain}'")]
    DomainNotAllowed { url: String, domain: String },

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Filesystem operation failed (writing a downloaded image).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Returns true if the error came from talking to the remote host
    /// (as opposed to local configuration or filesystem problems).
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::Timeout(_)
                | AppError::NetworkError(_)
                | AppError::DomainNotAllowed { .. }
        )
    }
}
