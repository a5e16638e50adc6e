use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::asset_path::AssetPaths;
use crate::retry::RetryPolicy;

/// Retry parameters for the watch loop (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per manifest check, the first one included.
    pub max_attempts: u32,
    /// Base backoff delay in seconds (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Backoff ceiling in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: cfg.max_attempts,
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

/// Runtime configuration loaded from `~/.config/hotchunk/config.toml`.
///
/// These are the values the build system stamps into a deployment: where
/// the files live, how they are named, and which build is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Base URL chunk and update files are served under.
    pub public_path: String,
    /// Hash of the currently loaded build.
    pub build_hash: String,
    /// Filename template for chunk files.
    #[serde(default = "default_chunk_filename")]
    pub chunk_filename: String,
    /// Filename template for hot-update chunk files.
    #[serde(default = "default_hot_update_chunk_filename")]
    pub hot_update_chunk_filename: String,
    /// Filename template for the hot-update manifest.
    #[serde(default = "default_hot_update_main_filename")]
    pub hot_update_main_filename: String,
    /// Bound on one manifest request, in seconds.
    #[serde(default = "default_manifest_timeout_secs")]
    pub manifest_timeout_secs: u64,
    /// Watch-loop poll interval, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Optional watch-loop retry policy; built-in defaults when missing.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_chunk_filename() -> String {
    "[id].bundle.js".to_string()
}

fn default_hot_update_chunk_filename() -> String {
    "[id].[hash].hot-update.js".to_string()
}

fn default_hot_update_main_filename() -> String {
    "[hash].hot-update.json".to_string()
}

fn default_manifest_timeout_secs() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            public_path: "/".to_string(),
            build_hash: String::new(),
            chunk_filename: default_chunk_filename(),
            hot_update_chunk_filename: default_hot_update_chunk_filename(),
            hot_update_main_filename: default_hot_update_main_filename(),
            manifest_timeout_secs: default_manifest_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            retry: None,
        }
    }
}

impl RuntimeConfig {
    /// The path set this config describes.
    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths::new(self.public_path.clone(), self.build_hash.clone())
            .with_chunk_filename(self.chunk_filename.clone())
            .with_hot_update_chunk_filename(self.hot_update_chunk_filename.clone())
            .with_hot_update_main_filename(self.hot_update_main_filename.clone())
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_secs(self.manifest_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.as_ref().map(Into::into).unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hotchunk")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RuntimeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RuntimeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<RuntimeConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: RuntimeConfig = toml::from_str(&data)?;
    Ok(cfg)
}
