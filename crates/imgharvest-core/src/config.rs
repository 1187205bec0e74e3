use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::HttpOptions;

/// Desktop browser User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Global configuration loaded from `~/.config/imgharvest/config.toml`.
///
/// Every field has a built-in default, so a partial (or empty) file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// `User-Agent` header applied to every request.
    pub user_agent: String,
    /// Per-request timeout in seconds (connect and transfer).
    pub request_timeout_secs: u64,
    /// Pause before each image fetch, in milliseconds.
    pub container_delay_ms: u64,
    /// Age after which a persisted sitemap is re-crawled. 0 = never expires.
    pub sitemap_max_age_days: u64,
    /// Maximum pages harvested at once.
    pub max_concurrent_pages: usize,
    /// Maximum image fetches in flight per page.
    pub max_concurrent_images: usize,
    /// Name of the top-level images directory under the base dir.
    pub images_dir: String,
    /// CSS class marking an image container `div`.
    pub container_class: String,
    /// CSS class marking the display-name `span` inside the container's anchor.
    pub heading_class: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 10,
            container_delay_ms: 100,
            sitemap_max_age_days: 7,
            max_concurrent_pages: 4,
            max_concurrent_images: 4,
            images_dir: "360_images".to_string(),
            container_class: "x-column".to_string(),
            heading_class: "heading".to_string(),
        }
    }
}

impl HarvestConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn container_delay(&self) -> Duration {
        Duration::from_millis(self.container_delay_ms)
    }

    pub fn sitemap_max_age(&self) -> Option<Duration> {
        match self.sitemap_max_age_days {
            0 => None,
            days => Some(Duration::from_secs(days.saturating_mul(24 * 60 * 60))),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgharvest")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HarvestConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HarvestConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Parse configuration from an existing TOML file.
pub fn load_from_path(path: &Path) -> Result<HarvestConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: HarvestConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
