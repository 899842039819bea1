use std::sync::LazyLock;

use picscrape_core::filter::is_image;
use picscrape_core::models::Protocol;
use picscrape_core::resolve::{extract_css_url, resolve, resolve_style};
use picscrape_core::traits::Scanner;
use scraper::{Html, Selector};

// One combined selector, so cells and images come back interleaved in
// document order rather than grouped by element type.
static CANDIDATES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td[style], img").expect("static selector is valid"));

/// Markup scanner using the `scraper` crate.
///
/// Visits `td[style]` and `img` elements in document order:
/// - `td[style]`: the first CSS `url(...)` is joined under the domain and
///   kept without the extension check;
/// - `img`: `src` is resolved and kept only if it looks like an image.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlImageScanner;

impl HtmlImageScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Scanner for HtmlImageScanner {
    fn scan(&self, html: &str, domain: &str, protocol: Protocol) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut found = Vec::new();

        for element in document.select(&CANDIDATES) {
            let element = element.value();
            if element.name() == "img" {
                let Some(src) = element.attr("src") else {
                    continue;
                };
                let resolved = resolve(src, domain, protocol);
                if is_image(&resolved) {
                    found.push(resolved);
                } else {
                    tracing::trace!(src, "Skipping non-image reference");
                }
            } else if let Some(captured) = element.attr("style").and_then(extract_css_url) {
                found.push(resolve_style(captured, domain, protocol));
            }
        }

        tracing::debug!(candidates = found.len(), "Scanned markup");
        found
    }
}
