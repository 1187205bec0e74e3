//! The crawler's output set and its on-disk snapshot (`sitemap.json`).

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// File name of the persisted sitemap under the base dir.
pub const SITEMAP_FILE: &str = "sitemap.json";

/// Set of absolute page URLs sharing the seed's origin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sitemap {
    urls: HashSet<String>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a URL; returns false if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in lexicographic order (stable output for files and harvesting).
    pub fn sorted(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.urls.iter().cloned().collect();
        urls.sort();
        urls
    }

    /// Save as a JSON array with 4-space indentation (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.sorted()
            .serialize(&mut ser)
            .context("serialize sitemap")?;
        std::fs::write(path, buf).with_context(|| format!("write sitemap: {}", path.display()))?;
        Ok(())
    }

    /// Load a snapshot. Returns None if the file is missing.
    pub fn load_from_path(path: &Path) -> Result<Option<Sitemap>> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read sitemap: {}", path.display())),
        };
        let urls: Vec<String> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse sitemap: {}", path.display()))?;
        Ok(Some(urls.into_iter().collect()))
    }

    /// Load a snapshot only if it is younger than `max_age` (None = never expires).
    ///
    /// Missing, stale and unreadable snapshots all yield `None`; the caller
    /// crawls again and overwrites the file.
    pub fn load_fresh(path: &Path, max_age: Option<Duration>) -> Option<Sitemap> {
        let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => {
                tracing::info!("sitemap file not found, crawling");
                return None;
            }
        };
        if let Some(max_age) = max_age {
            let age = SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO);
            if age > max_age {
                tracing::info!(
                    age_secs = age.as_secs(),
                    max_age_secs = max_age.as_secs(),
                    "sitemap is stale, crawling again"
                );
                return None;
            }
        }
        match Sitemap::load_from_path(path) {
            Ok(Some(sitemap)) => {
                tracing::info!("sitemap loaded from {} ({} pages)", path.display(), sitemap.len());
                Some(sitemap)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("ignoring unreadable sitemap: {:#}", e);
                None
            }
        }
    }
}

impl FromIterator<String> for Sitemap {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Sitemap {
            urls: iter.into_iter().collect(),
        }
    }
}
