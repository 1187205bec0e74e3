//! URL modeling and local name derivation.
//!
//! Resolves links against the page they appear on, decides same-origin
//! membership for the crawler, and derives page subfolder names and image
//! file extensions.

mod slug;

pub use slug::{slugify, split_extension};

use url::Url;

/// Subfolder name for the site root (empty URL path).
pub const ROOT_SUBFOLDER: &str = "root";

/// Extension used when an image reference carries none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Resolves `href` against `base` and drops any fragment.
///
/// Returns `None` if the reference cannot be joined or the result is not http(s).
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// True if both URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

/// Derives the per-page subfolder name from the URL path.
///
/// Path segments are joined with `-` and slugified; the site root maps to `root`.
///
/// # Examples
///
/// - `https://example.com/` → `"root"`
/// - `https://example.com/projects/2024/` → `"projects-2024"`
pub fn page_subfolder(url: &Url) -> String {
    let trimmed = url.path().trim_matches('/');
    if trimmed.is_empty() {
        return ROOT_SUBFOLDER.to_string();
    }
    let joined = trimmed.split('/').collect::<Vec<_>>().join("-");
    slugify(&joined)
}

/// Extension (with dot) of an image reference, ignoring query string and fragment.
/// Falls back to `.jpg`.
pub fn image_extension(src: &str) -> String {
    let path = src
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    match split_extension(path).1 {
        "" => DEFAULT_IMAGE_EXTENSION.to_string(),
        ext => ext.to_string(),
    }
}
