//! Turns raw `src` / CSS `url(...)` references into absolute URLs.
//!
//! Resolution is plain string concatenation: no percent-encoding, no
//! `..`/`.` normalisation, no slash collapsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Protocol;

static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    // Non-greedy: stops at the first closing parenthesis.
    Regex::new(r"url\((.*?)\)").expect("static regex is valid")
});

/// Resolve an `img[src]` reference against the page's domain and protocol.
///
/// Rules, first match wins:
/// 1. `//host/path` (protocol-relative) → `protocol://host/path`
/// 2. already starts with `http` → unchanged
/// 3. contains `domain` → `protocol://<raw>`
/// 4. anything else → `protocol://domain/<raw>`
///
/// Rule 3 is a substring test, so a path that merely mentions the domain
/// (`/blog/example.com-review.jpg`) is treated as carrying its host.
pub fn resolve(raw: &str, domain: &str, protocol: Protocol) -> String {
    if raw.starts_with("//") {
        format!("{protocol}:{raw}")
    } else if raw.starts_with("http") {
        raw.to_string()
    } else if raw.contains(domain) {
        format!("{protocol}://{raw}")
    } else {
        format!("{protocol}://{domain}/{raw}")
    }
}

/// Resolve a reference captured from a CSS `url(...)`.
///
/// Always joined under the domain; style backgrounds are domain-relative.
pub fn resolve_style(captured: &str, domain: &str, protocol: Protocol) -> String {
    format!("{protocol}://{domain}/{captured}")
}

/// Extract the contents of the first `url(...)` in an inline style.
///
/// Quotes inside the parentheses are kept verbatim.
pub fn extract_css_url(style: &str) -> Option<&str> {
    CSS_URL
        .captures(style)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
