pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod models;
pub mod resolve;
pub mod scrape;
pub mod traits;

#[cfg(test)]
mod testutil;

pub use config::ScrapeConfig;
pub use dedup::dedupe;
pub use error::AppError;
pub use filter::{is_gif, is_image};
pub use models::{MAX_IMAGES, Protocol, ScrapeOutcome, TargetSpec};
pub use resolve::{extract_css_url, resolve, resolve_style};
pub use scrape::ScrapeService;
pub use traits::{Fetcher, Scanner};
