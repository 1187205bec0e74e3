//! Run orchestration: load or crawl the sitemap, harvest every page with a
//! bounded number in flight, then write the ledger and the report.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use url::Url;

use crate::config::HarvestConfig;
use crate::crawler;
use crate::harvest::{harvest_page, HarvestContext, PageHarvest};
use crate::ledger::{self, ImageRecord};
use crate::run_log::RunLog;
use crate::sitemap::{Sitemap, SITEMAP_FILE};

/// Ledger file name under the images dir.
pub const LEDGER_FILE: &str = "all_image_data.csv";
/// Report file name under the images dir.
pub const REPORT_FILE: &str = "scraping_log.txt";

/// Status events for the caller to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestProgress {
    /// The page list is known. `from_cache` is true when `sitemap.json` was reused.
    SitemapReady { pages: usize, from_cache: bool },
    /// One page finished harvesting (`done` of `total`).
    PageDone {
        url: String,
        done: usize,
        total: usize,
        images: usize,
        errors: usize,
    },
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages: usize,
    pub records: Vec<ImageRecord>,
    pub log: RunLog,
    pub sitemap_path: PathBuf,
    pub ledger_path: PathBuf,
    pub report_path: PathBuf,
}

/// Runs a full harvest of `seed` into `base_dir`.
///
/// Item-level failures, including a sitemap that cannot be saved, end up in
/// the report. Only setup and output failures (directories, ledger, report)
/// are returned as errors.
pub async fn run(
    seed: &Url,
    base_dir: &Path,
    cfg: &HarvestConfig,
    progress_tx: Option<Sender<HarvestProgress>>,
) -> Result<RunSummary> {
    std::fs::create_dir_all(base_dir)
        .with_context(|| format!("create base dir: {}", base_dir.display()))?;
    let images_root = base_dir.join(&cfg.images_dir);
    std::fs::create_dir_all(&images_root)
        .with_context(|| format!("create images dir: {}", images_root.display()))?;

    let mut log = RunLog::new();
    let sitemap_path = base_dir.join(SITEMAP_FILE);

    let (sitemap, from_cache) = match Sitemap::load_fresh(&sitemap_path, cfg.sitemap_max_age()) {
        Some(s) => (s, true),
        None => {
            tracing::info!("crawling {}", seed);
            let seed_owned = seed.clone();
            let http = cfg.http_options();
            let (sitemap, crawl_log) = tokio::task::spawn_blocking(move || {
                let mut crawl_log = RunLog::new();
                let sitemap = crawler::crawl(&seed_owned, &http, &mut crawl_log);
                (sitemap, crawl_log)
            })
            .await
            .map_err(|e| anyhow::anyhow!("crawl task join: {}", e))?;
            log.merge(crawl_log);
            if sitemap.is_empty() {
                // Nothing to cache; the next run crawls again.
                tracing::warn!("crawl of {} found no pages", seed);
            } else {
                match sitemap.save_to_path(&sitemap_path) {
                    Ok(()) => tracing::info!(
                        "sitemap saved to {} ({} pages)",
                        sitemap_path.display(),
                        sitemap.len()
                    ),
                    Err(e) => {
                        // The in-memory sitemap still drives this run.
                        tracing::warn!("could not save sitemap: {:#}", e);
                        log.error(sitemap_path.display().to_string(), format!("{:#}", e));
                    }
                }
            }
            (sitemap, false)
        }
    };

    let pages = sitemap.sorted();
    let total = pages.len();
    if let Some(tx) = &progress_tx {
        let _ = tx
            .send(HarvestProgress::SitemapReady {
                pages: total,
                from_cache,
            })
            .await;
    }

    let ctx = Arc::new(HarvestContext::from_config(cfg, images_root.clone())?);
    let results = harvest_pages(&pages, ctx, cfg.max_concurrent_pages, progress_tx).await?;

    let mut records = Vec::new();
    for page in results {
        records.extend(page.records);
        log.merge(page.log);
    }

    let ledger_path = images_root.join(LEDGER_FILE);
    ledger::write_ledger(&ledger_path, &records)?;
    let report_path = images_root.join(REPORT_FILE);
    log.write_report(&report_path, seed.as_str())?;

    tracing::info!(
        pages = total,
        attempted = log.total_attempted(),
        downloaded = log.downloaded.len(),
        skipped = log.skipped.len(),
        replaced = log.replaced.len(),
        errors = log.errors.len(),
        "run complete"
    );

    Ok(RunSummary {
        pages: total,
        records,
        log,
        sitemap_path,
        ledger_path,
        report_path,
    })
}

/// Harvests `pages` with up to `max_concurrent` in flight. Results are
/// returned in the order of `pages`, whatever order they finish in.
async fn harvest_pages(
    pages: &[String],
    ctx: Arc<HarvestContext>,
    max_concurrent: usize,
    progress_tx: Option<Sender<HarvestProgress>>,
) -> Result<Vec<PageHarvest>> {
    let max_concurrent = max_concurrent.max(1);
    let total = pages.len();
    let mut results: Vec<Option<PageHarvest>> = vec![None; total];
    let mut queue = pages.iter().cloned().enumerate();
    let mut join_set = tokio::task::JoinSet::new();
    let mut done = 0usize;

    loop {
        while join_set.len() < max_concurrent {
            let Some((index, url)) = queue.next() else {
                break;
            };
            let ctx = Arc::clone(&ctx);
            join_set.spawn_blocking(move || {
                let harvest = harvest_page(&url, &ctx);
                (index, url, harvest)
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let (index, url, harvest) = res.map_err(|e| anyhow::anyhow!("page task join: {}", e))?;
        done += 1;
        if let Some(tx) = &progress_tx {
            let _ = tx
                .send(HarvestProgress::PageDone {
                    url,
                    done,
                    total,
                    images: harvest.records.len(),
                    errors: harvest.log.errors.len(),
                })
                .await;
        }
        results[index] = Some(harvest);
    }

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_seed_still_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = HarvestConfig {
            request_timeout_secs: 1,
            container_delay_ms: 0,
            ..HarvestConfig::default()
        };
        let seed = Url::parse("http://127.0.0.1:9/").unwrap();
        let summary = run(&seed, dir.path(), &cfg, None).await.unwrap();

        assert_eq!(summary.pages, 0);
        assert!(summary.records.is_empty());
        assert_eq!(summary.log.errors.len(), 1);
        assert_eq!(summary.log.errors[0].url, "http://127.0.0.1:9/");
        assert!(!summary.sitemap_path.exists());
        let ledger = std::fs::read_to_string(&summary.ledger_path).unwrap();
        assert_eq!(ledger, "Old Name,URL,New Name,Folder Name\r\n");
        let report = std::fs::read_to_string(&summary.report_path).unwrap();
        assert!(report.contains("Base URL: http://127.0.0.1:9/\n"));
        assert!(report.contains("Total Images Attempted: 0\n"));
    }

    #[tokio::test]
    async fn cached_sitemap_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let cached: Sitemap = ["http://127.0.0.1:9/only".to_string()].into_iter().collect();
        cached.save_to_path(&dir.path().join(SITEMAP_FILE)).unwrap();
        let cfg = HarvestConfig {
            request_timeout_secs: 1,
            container_delay_ms: 0,
            ..HarvestConfig::default()
        };
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let seed = Url::parse("http://127.0.0.1:9/").unwrap();
        let summary = run(&seed, dir.path(), &cfg, Some(tx)).await.unwrap();

        assert_eq!(summary.pages, 1);
        assert_eq!(
            rx.recv().await,
            Some(HarvestProgress::SitemapReady {
                pages: 1,
                from_cache: true
            })
        );
        match rx.recv().await {
            Some(HarvestProgress::PageDone { url, done, total, .. }) => {
                assert_eq!(url, "http://127.0.0.1:9/only");
                assert_eq!((done, total), (1, 1));
            }
            other => panic!("expected PageDone, got {:?}", other),
        }
    }
}
