//! Turns extracted containers into download jobs, naming each file.

use std::path::{Path, PathBuf};
use url::Url;

use super::extract::{Container, ImageRef};
use crate::ledger::ImageRecord;
use crate::run_log::RunLog;
use crate::url_model::{image_extension, slugify};

/// One image to fetch, with the ledger row it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageJob {
    /// Absolute image URL.
    pub image_url: String,
    /// Local destination (`<page dir>/<filename>`).
    pub target: PathBuf,
    pub record: ImageRecord,
}

/// Names every container and builds jobs in document order.
///
/// Containers without a usable display name are named `<subfolder>-<n>`,
/// with `n` counting from 1 across the page. Containers without an image or
/// with an inline/empty `src` are recorded as skipped; unresolvable `src`
/// values as errors. Neither produces a job.
pub fn plan_page(
    page_url: &Url,
    subfolder: &str,
    page_dir: &Path,
    containers: Vec<Container>,
    log: &mut RunLog,
) -> Vec<ImageJob> {
    let mut unnamed_counter = 1u32;
    let mut jobs = Vec::new();

    for container in containers {
        let named = container
            .display_name
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty());
        let name = match named {
            Some(n) => n,
            None => {
                let n = format!("{}-{}", slugify(subfolder), unnamed_counter);
                unnamed_counter += 1;
                n
            }
        };

        let src = match container.image {
            ImageRef::Missing => {
                log.skipped(
                    page_url.as_str(),
                    format!("No image found in container for project: {}", name),
                );
                continue;
            }
            ImageRef::NoSrc => {
                log.skipped(page_url.as_str(), invalid_src_reason(&name));
                continue;
            }
            ImageRef::Src(src) if src.trim().is_empty() || src.starts_with("data:") => {
                log.skipped(page_url.as_str(), invalid_src_reason(&name));
                continue;
            }
            ImageRef::Src(src) => src,
        };

        let image_url = match page_url.join(src.trim()) {
            Ok(u) => u,
            Err(e) => {
                log.error(src.as_str(), format!("cannot resolve image reference: {}", e));
                continue;
            }
        };

        let filename = format!("{}{}", name, image_extension(&src));
        jobs.push(ImageJob {
            image_url: image_url.to_string(),
            target: page_dir.join(&filename),
            record: ImageRecord {
                original_src: src,
                page_path: page_url.path().to_string(),
                filename,
                folder: subfolder.to_string(),
            },
        });
    }

    jobs
}

fn invalid_src_reason(name: &str) -> String {
    format!("Skipping image with invalid src in project: {}", name)
}
