pub mod download;
pub mod fetcher;
pub mod image_cache;
pub mod probe;
pub mod scanner;

pub use download::{DownloadReport, Downloader, file_name_for};
pub use fetcher::{DESKTOP_USER_AGENT, ReqwestFetcher};
pub use image_cache::{ImageCache, LoadedImage};
pub use probe::{ensure_protocol, get_domain};
pub use scanner::HtmlImageScanner;
