//! Hyperlink extraction from fetched pages.

use scraper::{Html, Selector};
use url::Url;

use crate::url_model::{resolve_link, same_origin};

/// Returns every `<a href>` target of `html` that resolves (against `page_url`)
/// to a URL with the same origin as `seed`. Fragments are dropped; order follows
/// the document and duplicates are kept.
pub fn same_origin_links(html: &str, page_url: &Url, seed: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(page_url, href))
        .filter(|url| same_origin(url, seed))
        .collect()
}
