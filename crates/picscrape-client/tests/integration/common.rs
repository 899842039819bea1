use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::{Html, Redirect};
use axum::routing::get;
use picscrape_core::error::AppError;
use picscrape_core::traits::Fetcher;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

pub const GALLERY_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Gallery</title></head>
<body>
  <img src="/a.jpg" alt="first">
  <img src="//cdn.x.com/b.png" alt="second">
  <img src="/a.jpg" alt="duplicate">
  <img src="/scripts/counter.php" alt="not an image">
  <table>
    <tr><td style="background-image:url(c.gif)">cell</td></tr>
  </table>
</body>
</html>"#;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-png-body";
pub const GIF_BYTES: &[u8] = b"GIF89a-fake-gif-body";

/// Page with `count` distinct qualifying `img` tags.
pub fn many_images_html(count: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..count {
        html.push_str(&format!(r#"<img src="/img/{i}.png">"#));
    }
    html.push_str("</body></html>");
    html
}

/// Route library logs to the test harness; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A local HTTP server serving fixture pages and images.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, fixture_router()).await.unwrap();
        });
        Self { addr, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Hostname the fetcher must be restricted to.
    pub fn domain(&self) -> String {
        self.addr.ip().to_string()
    }

    /// `host:port` without a scheme, as a user would type it.
    pub fn bare(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn fixture_router() -> Router {
    Router::new()
        .route("/gallery", get(|| async { Html(GALLERY_HTML) }))
        .route("/many", get(|| async { Html(many_images_html(600)) }))
        .route("/hop", get(|| async { Redirect::temporary("/gallery") }))
        .route(
            "/escape",
            get(|| async { Redirect::temporary("http://elsewhere.invalid/gallery") }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html("<html>late</html>")
            }),
        )
        .route(
            "/img/a.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route(
            "/img/logo.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES) }),
        )
        .route(
            "/cdn/logo.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], GIF_BYTES) }),
        )
        .route(
            "/img/anim.gif",
            get(|| async { ([(header::CONTENT_TYPE, "image/gif")], GIF_BYTES) }),
        )
        .route(
            "/img/fake.gif",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html></html>") }),
        )
}

/// Address of a port that was open a moment ago and is now closed.
pub async fn closed_port_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Fetcher serving a fixed page for any allowed URL.
#[derive(Clone)]
pub struct FixtureFetcher {
    html: String,
}

impl FixtureFetcher {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

impl Fetcher for FixtureFetcher {
    async fn fetch(&self, _url: &str, _allowed_domain: &str) -> Result<String, AppError> {
        Ok(self.html.clone())
    }
}
