//! Per-page image harvester.
//!
//! Fetches one page, finds the image containers, names each image, and runs
//! fetch-or-replace for all of them on a bounded worker pool. Returns the
//! page's ledger rows (document order) and its own run log.

mod extract;
mod locks;
mod plan;

pub use extract::{extract_containers, Container, ContainerSelectors, ImageRef};
pub use locks::TargetLocks;
pub use plan::{plan_page, ImageJob};

use anyhow::Result;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use url::Url;

use crate::config::HarvestConfig;
use crate::fetch_or_replace::{fetch_or_replace, FetchOutcome};
use crate::http::{self, HttpOptions};
use crate::ledger::ImageRecord;
use crate::run_log::RunLog;
use crate::url_model::page_subfolder;

/// Everything a page harvest needs; shared read-only across page tasks.
#[derive(Debug, Clone)]
pub struct HarvestContext {
    pub http: HttpOptions,
    /// `<base_dir>/<images_dir>`; page subfolders are created beneath it.
    pub images_root: PathBuf,
    pub selectors: ContainerSelectors,
    /// Pause before each image fetch.
    pub delay: Duration,
    /// Maximum image fetches in flight for one page.
    pub max_concurrent_images: usize,
    /// Serializes fetches that resolve to the same local file.
    pub target_locks: Arc<TargetLocks>,
}

impl HarvestContext {
    pub fn from_config(cfg: &HarvestConfig, images_root: PathBuf) -> Result<Self> {
        Ok(Self {
            http: cfg.http_options(),
            images_root,
            selectors: ContainerSelectors::new(&cfg.container_class, &cfg.heading_class)?,
            delay: cfg.container_delay(),
            max_concurrent_images: cfg.max_concurrent_images.max(1),
            target_locks: Arc::new(TargetLocks::new()),
        })
    }
}

/// Result of harvesting one page.
#[derive(Debug, Clone, Default)]
pub struct PageHarvest {
    /// One row per attempted image, in document order.
    pub records: Vec<ImageRecord>,
    pub log: RunLog,
}

/// Harvests every image container on `url`. Blocks the current thread.
///
/// Page-level failures (bad URL, fetch error, unwritable subfolder) are
/// recorded in the returned log and yield no records.
pub fn harvest_page(url: &str, ctx: &HarvestContext) -> PageHarvest {
    let mut harvest = PageHarvest::default();

    let page_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            harvest.log.error(url, format!("invalid page URL: {}", e));
            return harvest;
        }
    };

    let page = match http::fetch_page(url, &ctx.http) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("error fetching page {}: {}", url, e);
            harvest.log.error(url, &e);
            return harvest;
        }
    };

    let subfolder = page_subfolder(&page_url);
    let page_dir = ctx.images_root.join(&subfolder);
    if let Err(e) = std::fs::create_dir_all(&page_dir) {
        tracing::warn!("cannot create {}: {}", page_dir.display(), e);
        harvest
            .log
            .error(url, format!("create dir {}: {}", page_dir.display(), e));
        return harvest;
    }

    let containers = extract_containers(&page.body, &ctx.selectors);
    tracing::debug!("{}: {} containers", url, containers.len());
    let jobs = plan_page(&page_url, &subfolder, &page_dir, containers, &mut harvest.log);

    let outcomes = fetch_all(&jobs, ctx);
    for (job, outcome) in jobs.into_iter().zip(outcomes) {
        outcome.record(&job.image_url, &mut harvest.log);
        harvest.records.push(job.record);
    }

    tracing::info!(
        "finished {}: {} images, {} downloaded, {} replaced, {} errors",
        url,
        harvest.records.len(),
        harvest.log.downloaded.len(),
        harvest.log.replaced.len(),
        harvest.log.errors.len()
    );
    harvest
}

/// Runs fetch-or-replace for every job on up to `ctx.max_concurrent_images`
/// worker threads. Each worker pauses `ctx.delay` before every fetch and
/// holds the target's lock for the whole fetch. Outcomes are returned in job order.
fn fetch_all(jobs: &[ImageJob], ctx: &HarvestContext) -> Vec<FetchOutcome> {
    let count = jobs.len();
    if count == 0 {
        return Vec::new();
    }

    let work: Mutex<VecDeque<(usize, &ImageJob)>> = Mutex::new(jobs.iter().enumerate().collect());
    let mut results: Vec<Option<FetchOutcome>> = vec![None; count];
    let num_workers = ctx.max_concurrent_images.clamp(1, count);

    std::thread::scope(|s| {
        let (tx, rx) = mpsc::channel();
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            s.spawn(move || loop {
                let next = match work.lock() {
                    Ok(mut queue) => queue.pop_front(),
                    Err(_) => None,
                };
                let Some((index, job)) = next else {
                    break;
                };
                if !ctx.delay.is_zero() {
                    std::thread::sleep(ctx.delay);
                }
                let slot = ctx.target_locks.slot(&job.target);
                let outcome = {
                    let _held = locks::hold(&slot);
                    fetch_or_replace(&job.image_url, &job.target, &ctx.http)
                };
                if tx.send((index, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(tx);
        for (index, outcome) in rx {
            results[index] = Some(outcome);
        }
    });

    results
        .into_iter()
        .map(|r| {
            r.unwrap_or_else(|| FetchOutcome::Failed {
                error: "image worker exited before finishing".to_string(),
            })
        })
        .collect()
}
