//! Classmark configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::DEFAULT_BASE_URL;

/// Record server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the record server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Max retries when publishing a result.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay between retries in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

/// Local device settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Snapshot file path. Defaults to `~/.config/classmark/device.json`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Top-level classmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassmarkConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    /// Output directory for saved outcomes and exports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./classmark-results")
}

impl Default for ClassmarkConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            device: DeviceConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `classmark.toml` in the current directory
/// 2. `~/.config/classmark/config.toml`
///
/// Environment variable override: `CLASSMARK_STORE_URL`.
pub fn load_config() -> Result<ClassmarkConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClassmarkConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("classmark.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClassmarkConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClassmarkConfig::default(),
    };

    if let Ok(url) = std::env::var("CLASSMARK_STORE_URL") {
        config.store.base_url = url;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("classmark"))
}
