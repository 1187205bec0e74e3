//! Same-origin site crawler.
//!
//! Starting from a seed URL, fetches pages one at a time, follows every
//! same-origin `<a href>`, and returns the set of pages that fetched
//! successfully. Each URL is fetched at most once. Frontier order is
//! unspecified: the result set does not depend on it.

mod links;

pub use links::same_origin_links;

use std::collections::HashSet;
use url::Url;

use crate::http::{self, HttpOptions};
use crate::run_log::RunLog;
use crate::sitemap::Sitemap;

/// Crawls everything reachable from `seed` over same-origin links.
///
/// Pages that fail to fetch are recorded in `log.errors` and left out of the
/// result. No retries and no depth limit. Blocks the current thread.
pub fn crawl(seed: &Url, opts: &HttpOptions, log: &mut RunLog) -> Sitemap {
    let mut seed = seed.clone();
    seed.set_fragment(None);

    let mut sitemap = Sitemap::new();
    // Every URL ever queued; the frontier only holds those not yet fetched.
    let mut seen: HashSet<String> = HashSet::new();
    let mut frontier: Vec<String> = Vec::new();
    seen.insert(seed.to_string());
    frontier.push(seed.to_string());

    while let Some(url) = frontier.pop() {
        let page = match http::fetch_page(&url, opts) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("error fetching {}: {}", url, e);
                log.error(url.as_str(), &e);
                continue;
            }
        };
        tracing::debug!("crawled {}", url);
        sitemap.insert(url.as_str());

        if !page.is_html() {
            continue;
        }
        let Ok(page_url) = Url::parse(&url) else {
            continue;
        };
        for link in same_origin_links(&page.body, &page_url, &seed) {
            let link = String::from(link);
            if seen.insert(link.clone()) {
                frontier.push(link);
            }
        }
    }

    tracing::info!(
        "crawl of {} finished: {} pages, {} errors",
        seed,
        sitemap.len(),
        log.errors.len()
    );
    sitemap
}
