use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filter::FilterMode;

/// Scroll-mode scanning parameters (optional `[scroll]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Pixels scrolled per step.
    pub step_px: u64,
    /// Milliseconds to wait after each scroll before rescanning.
    pub settle_delay_ms: u64,
    /// Upper bound on scroll steps (guards against infinite-scroll pages).
    pub max_iterations: u32,
    /// Distance from the bottom (pixels) that already counts as "at the bottom".
    pub bottom_slack_px: u64,
    /// Viewport height assumed for pages loaded without a renderer.
    pub viewport_height_px: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            step_px: 500,
            settle_delay_ms: 300,
            max_iterations: 50,
            bottom_slack_px: 100,
            viewport_height_px: 900,
        }
    }
}

impl ScrollConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Filter defaults (optional `[filter]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Quiescence window for debounced filter evaluation.
    pub debounce_ms: u64,
    /// Mode used when the CLI gets `--filter` without `--mode`.
    #[serde(default)]
    pub default_mode: FilterMode,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            default_mode: FilterMode::Normal,
        }
    }
}

/// Global configuration loaded from `~/.config/snapstream/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Where downloads land when `--dir` is not given (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// User-Agent sent with page and image requests.
    pub user_agent: String,
    /// Send `Referer`/`Origin` set to the scanned page's origin with image requests.
    pub send_referrer: bool,
    /// Optional connect timeout in seconds (None = transport default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            download_dir: None,
            user_agent: format!("snapstream/{}", env!("CARGO_PKG_VERSION")),
            send_referrer: true,
            connect_timeout_secs: None,
            scroll: ScrollConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl SnapConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Download directory: explicit override, then config, then the current directory.
    pub fn resolve_download_dir(&self, cli_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        std::env::current_dir().context("current directory")
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("snapstream")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SnapConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &Path) -> Result<SnapConfig> {
    if !path.exists() {
        let default_cfg = SnapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: SnapConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
