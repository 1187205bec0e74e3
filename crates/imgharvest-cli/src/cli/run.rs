//! Runs the harvest pipeline and prints status lines as it goes.

use anyhow::Result;
use imgharvest_core::config::HarvestConfig;
use imgharvest_core::pipeline::{self, HarvestProgress};
use std::path::Path;
use url::Url;

pub async fn run_harvest(seed: &Url, base_dir: &Path, cfg: &HarvestConfig) -> Result<()> {
    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<HarvestProgress>(16);
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                HarvestProgress::SitemapReady { pages, from_cache } => {
                    let source = if from_cache { "loaded" } else { "crawled" };
                    println!("Sitemap {}: {} pages", source, pages);
                }
                HarvestProgress::PageDone {
                    url,
                    done,
                    total,
                    images,
                    errors,
                } => {
                    println!(
                        "[{}/{}] {}  {} images, {} errors",
                        done, total, url, images, errors
                    );
                }
            }
        }
    });

    println!("Harvesting {}", seed);
    let result = pipeline::run(seed, base_dir, cfg, Some(progress_tx)).await;
    let _ = progress_handle.await;
    let summary = result?;

    println!(
        "Scraping complete. Images saved in {}",
        base_dir.join(&cfg.images_dir).display()
    );
    println!(
        "Attempted {}: {} downloaded, {} skipped, {} replaced, {} errors",
        summary.log.total_attempted(),
        summary.log.downloaded.len(),
        summary.log.skipped.len(),
        summary.log.replaced.len(),
        summary.log.errors.len()
    );
    println!("Ledger: {}", summary.ledger_path.display());
    println!("Report: {}", summary.report_path.display());
    Ok(())
}
