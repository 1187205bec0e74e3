//! Integration test: same-origin crawl over a small fixture site.

mod common;

use common::site_server::Site;
use imgharvest_core::crawler::crawl;
use imgharvest_core::http::HttpOptions;
use imgharvest_core::run_log::RunLog;
use std::time::Duration;
use url::Url;

fn opts() -> HttpOptions {
    HttpOptions {
        user_agent: "imgharvest-test".to_string(),
        timeout: Duration::from_secs(5),
    }
}

#[test]
fn diamond_graph_visits_every_page_once() {
    let server = Site::new()
        .html("/a", r#"<a href="/b">B</a> <a href="c">C</a>"#)
        .html("/b", r#"<a href="/d">D</a> <a href="/a#top">back</a>"#)
        .html("/c", r#"<a href="/d">D</a>"#)
        .html("/d", "<p>leaf</p>")
        .start();
    let seed = Url::parse(&server.url("/a")).unwrap();
    let mut log = RunLog::new();

    let sitemap = crawl(&seed, &opts(), &mut log);

    let expected: Vec<String> = ["/a", "/b", "/c", "/d"]
        .iter()
        .map(|p| server.url(p))
        .collect();
    assert_eq!(sitemap.sorted(), expected);
    assert!(log.errors.is_empty());
    for path in ["/a", "/b", "/c", "/d"] {
        assert_eq!(server.count("GET", path), 1, "{} fetched more than once", path);
    }
}

#[test]
fn off_origin_links_are_not_followed() {
    let other = Site::new().html("/x", "<p>elsewhere</p>").start();
    let page = format!(
        r#"<a href="{}">other origin</a> <a href="mailto:a@b.c">mail</a> <a href="/about">about</a>"#,
        other.url("/x")
    );
    let server = Site::new()
        .html("/", &page)
        .html("/about", "<p>about</p>")
        .start();
    let seed = Url::parse(&server.url("/")).unwrap();
    let mut log = RunLog::new();

    let sitemap = crawl(&seed, &opts(), &mut log);

    assert_eq!(sitemap.sorted(), [server.url("/"), server.url("/about")]);
    assert_eq!(other.total("GET"), 0);
}

#[test]
fn broken_links_become_errors() {
    let server = Site::new()
        .html("/", r#"<a href="/missing">gone</a> <a href="/ok">ok</a>"#)
        .html("/ok", "<p>ok</p>")
        .start();
    let seed = Url::parse(&server.url("/")).unwrap();
    let mut log = RunLog::new();

    let sitemap = crawl(&seed, &opts(), &mut log);

    assert_eq!(sitemap.len(), 2);
    assert!(!sitemap.contains(&server.url("/missing")));
    assert_eq!(log.errors.len(), 1);
    assert_eq!(log.errors[0].url, server.url("/missing"));
    assert_eq!(log.errors[0].error, "HTTP 404");
}

#[test]
fn non_html_pages_are_listed_but_not_parsed() {
    let server = Site::new()
        .html("/", r#"<a href="/doc.txt">doc</a>"#)
        .file("/doc.txt", "text/plain", br#"<a href="/hidden">hidden</a>"#)
        .html("/hidden", "<p>hidden</p>")
        .start();
    let seed = Url::parse(&server.url("/")).unwrap();
    let mut log = RunLog::new();

    let sitemap = crawl(&seed, &opts(), &mut log);

    assert_eq!(sitemap.sorted(), [server.url("/"), server.url("/doc.txt")]);
    assert_eq!(server.count("GET", "/hidden"), 0);
}
