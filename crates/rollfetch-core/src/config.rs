use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::queue::DEFAULT_CONCURRENCY;
use crate::transport::{CurlTransport, RequestOptions};

/// Global configuration loaded from `~/.config/rollfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollfetchConfig {
    /// Requests in flight when the caller does not pass a limit.
    pub default_concurrency: usize,
    /// Longest a tick blocks waiting for socket activity, in milliseconds.
    /// Also bounds how late a cancellation is noticed.
    pub wait_timeout_ms: u64,
    /// Options applied to every request.
    #[serde(default)]
    pub request: RequestOptions,
}

impl Default for RollfetchConfig {
    fn default() -> Self {
        Self {
            default_concurrency: DEFAULT_CONCURRENCY,
            wait_timeout_ms: 100,
            request: RequestOptions::default(),
        }
    }
}

impl RollfetchConfig {
    /// Curl transport honoring `wait_timeout_ms`.
    pub fn transport(&self) -> CurlTransport {
        CurlTransport::new().with_wait_timeout(Duration::from_millis(self.wait_timeout_ms.max(1)))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rollfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RollfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RollfetchConfig::default();
        let toml = default_cfg.to_toml()?;
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
pub fn load_from(path: &Path) -> Result<RollfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: RollfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
