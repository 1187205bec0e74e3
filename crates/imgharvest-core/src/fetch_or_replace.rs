//! Idempotent image fetch: skip if the local copy matches the remote size,
//! replace it if the size differs, download it if missing.
//!
//! The size comparison is a cheap freshness check, not a content check: two
//! different images of equal byte length are treated as the same.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::http::{self, HttpOptions};
use crate::run_log::RunLog;
use crate::storage::{self, StorageWriter};

/// Skip reason recorded when the local file already matches.
pub const SKIP_SAME_SIZE: &str = "already exists and correct size";

/// What happened to one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// No local file existed; it was downloaded.
    Downloaded { filepath: PathBuf },
    /// Local file size equals the remote declared size; nothing fetched.
    Skipped { reason: String },
    /// Local file had a different size; it was deleted and downloaded again.
    Replaced { old_size: u64, new_size: u64 },
    /// Transport or filesystem failure; the error text is kept for the report.
    Failed { error: String },
}

impl FetchOutcome {
    /// Appends this outcome for `url` to the matching run log section.
    pub fn record(self, url: &str, log: &mut RunLog) {
        match self {
            FetchOutcome::Downloaded { filepath } => log.downloaded(url, filepath),
            FetchOutcome::Skipped { reason } => log.skipped(url, reason),
            FetchOutcome::Replaced { old_size, new_size } => log.replaced(url, old_size, new_size),
            FetchOutcome::Failed { error } => log.error(url, error),
        }
    }
}

/// Ensures the image at `url` exists at `target`, fetching only when needed.
///
/// Never fails: every error is folded into `FetchOutcome::Failed`.
pub fn fetch_or_replace(url: &str, target: &Path, opts: &HttpOptions) -> FetchOutcome {
    match try_fetch_or_replace(url, target, opts) {
        Ok(outcome) => {
            tracing::debug!(url, target = %target.display(), ?outcome, "image processed");
            outcome
        }
        Err(e) => {
            tracing::warn!("error processing image {}: {:#}", url, e);
            FetchOutcome::Failed {
                error: format!("{:#}", e),
            }
        }
    }
}

fn try_fetch_or_replace(url: &str, target: &Path, opts: &HttpOptions) -> Result<FetchOutcome> {
    let existing_size = match std::fs::metadata(target) {
        Ok(m) => Some(m.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("stat {}", target.display()));
        }
    };

    let Some(existing_size) = existing_size else {
        download_to(url, target, opts)?;
        return Ok(FetchOutcome::Downloaded {
            filepath: target.to_path_buf(),
        });
    };

    let head = http::head(url, opts).with_context(|| format!("HEAD {}", url))?;
    let remote_size = head.content_length.unwrap_or(0);
    if existing_size == remote_size {
        return Ok(FetchOutcome::Skipped {
            reason: SKIP_SAME_SIZE.to_string(),
        });
    }

    tracing::info!(
        "{} exists but is a different size ({} local, {} remote), replacing",
        target.display(),
        existing_size,
        remote_size
    );
    std::fs::remove_file(target).with_context(|| format!("remove {}", target.display()))?;
    let new_size = download_to(url, target, opts)?;
    Ok(FetchOutcome::Replaced {
        old_size: existing_size,
        new_size,
    })
}

/// Streams `url` into `<target>.part`, then renames it onto `target`.
fn download_to(url: &str, target: &Path, opts: &HttpOptions) -> Result<u64> {
    let writer = StorageWriter::create(&storage::temp_path(target))?;
    let written = match http::download(url, opts, &writer) {
        Ok(n) => n,
        Err(e) => {
            writer.discard();
            return Err(e).with_context(|| format!("GET {}", url));
        }
    };
    writer.sync()?;
    writer.finalize(target)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_routes_to_sections() {
        let mut log = RunLog::new();
        FetchOutcome::Downloaded {
            filepath: PathBuf::from("a.jpg"),
        }
        .record("u1", &mut log);
        FetchOutcome::Skipped {
            reason: SKIP_SAME_SIZE.to_string(),
        }
        .record("u2", &mut log);
        FetchOutcome::Replaced {
            old_size: 1,
            new_size: 2,
        }
        .record("u3", &mut log);
        FetchOutcome::Failed {
            error: "HTTP 500".to_string(),
        }
        .record("u4", &mut log);

        assert_eq!(log.downloaded[0].url, "u1");
        assert_eq!(log.skipped[0].reason, SKIP_SAME_SIZE);
        assert_eq!((log.replaced[0].old_size, log.replaced[0].new_size), (1, 2));
        assert_eq!(log.errors[0].error, "HTTP 500");
    }

    #[test]
    fn unwritable_target_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-subdir").join("x.jpg");
        let opts = HttpOptions {
            user_agent: "test".to_string(),
            timeout: std::time::Duration::from_secs(1),
        };
        match fetch_or_replace("http://127.0.0.1:9/x.jpg", &target, &opts) {
            FetchOutcome::Failed { error } => assert!(error.contains("temp file")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
