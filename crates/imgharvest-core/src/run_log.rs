//! Run-scoped outcome accumulator and the end-of-run text report.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedEntry {
    pub url: String,
    pub filepath: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedEntry {
    pub url: String,
    pub old_size: u64,
    pub new_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub url: String,
    pub error: String,
}

/// Categorized outcomes of one run. Each page builds its own log; the
/// pipeline merges them in sitemap order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    pub downloaded: Vec<DownloadedEntry>,
    pub skipped: Vec<SkippedEntry>,
    pub replaced: Vec<ReplacedEntry>,
    pub errors: Vec<ErrorEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloaded(&mut self, url: impl Into<String>, filepath: impl Into<PathBuf>) {
        self.downloaded.push(DownloadedEntry {
            url: url.into(),
            filepath: filepath.into(),
        });
    }

    pub fn skipped(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            url: url.into(),
            reason: reason.into(),
        });
    }

    pub fn replaced(&mut self, url: impl Into<String>, old_size: u64, new_size: u64) {
        self.replaced.push(ReplacedEntry {
            url: url.into(),
            old_size,
            new_size,
        });
    }

    pub fn error(&mut self, url: impl Into<String>, error: impl ToString) {
        self.errors.push(ErrorEntry {
            url: url.into(),
            error: error.to_string(),
        });
    }

    /// Appends every entry of `other`, preserving order.
    pub fn merge(&mut self, other: RunLog) {
        self.downloaded.extend(other.downloaded);
        self.skipped.extend(other.skipped);
        self.replaced.extend(other.replaced);
        self.errors.extend(other.errors);
    }

    /// Downloaded + skipped + replaced; errors are not counted as attempts.
    pub fn total_attempted(&self) -> usize {
        self.downloaded.len() + self.skipped.len() + self.replaced.len()
    }

    /// Renders the text report. `timestamp` is printed verbatim in the title line.
    pub fn render_report(&self, timestamp: &str, base_url: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Scraping Log - {}\n", timestamp);
        let _ = writeln!(out, "Base URL: {}\n", base_url);
        let _ = writeln!(out, "Total Images Attempted: {}\n", self.total_attempted());

        out.push_str("--- Downloaded Images ---\n");
        for item in &self.downloaded {
            let _ = writeln!(out, "  - URL: {}", item.url);
            let _ = writeln!(out, "    Filepath: {}", item.filepath.display());
        }
        let _ = writeln!(out, "\nTotal Downloaded: {}\n", self.downloaded.len());

        out.push_str("--- Skipped Images ---\n");
        for item in &self.skipped {
            let _ = writeln!(out, "  - URL: {}", item.url);
            let _ = writeln!(out, "    Reason: {}", item.reason);
        }
        let _ = writeln!(out, "\nTotal Skipped: {}\n", self.skipped.len());

        out.push_str("--- Replaced Images ---\n");
        for item in &self.replaced {
            let _ = writeln!(out, "  - URL: {}", item.url);
            let _ = writeln!(out, "    Old Size: {}", item.old_size);
            let _ = writeln!(out, "    New Size: {}", item.new_size);
        }
        let _ = writeln!(out, "\nTotal Replaced: {}\n", self.replaced.len());

        out.push_str("--- Errors ---\n");
        for item in &self.errors {
            let _ = writeln!(out, "  - URL: {}", item.url);
            let _ = writeln!(out, "    Error: {}", item.error);
        }
        let _ = writeln!(out, "\nTotal Errors: {}\n", self.errors.len());

        out
    }

    /// Writes the report to `path`, stamped with the current local time.
    pub fn write_report(&self, path: &Path, base_url: &str) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        std::fs::write(path, self.render_report(&timestamp, base_url))
            .with_context(|| format!("write report: {}", path.display()))?;
        Ok(())
    }
}
