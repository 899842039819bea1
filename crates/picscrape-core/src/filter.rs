/// File extensions accepted as images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".bmp", ".svg"];

/// Whether a resolved URL looks like an image, judged by its suffix alone.
///
/// Case-insensitive. Query strings are not stripped, so `a.jpg?v=2` is rejected.
pub fn is_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Whether a URL names a GIF (needs content-type verification before display).
pub fn is_gif(url: &str) -> bool {
    url.to_ascii_lowercase().ends_with(".gif")
}
