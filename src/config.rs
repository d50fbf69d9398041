use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::preview::PreviewOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub preview: PreviewConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the analysis service; absent means demo mode
    pub url: Option<String>,
    /// Send messages to the service instead of placeholder replies
    pub live: bool,
    /// Check the service health endpoint at startup
    pub probe: bool,
    pub timeout_secs: u64,
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub quote_aware: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            live: false,
            probe: false,
            timeout_secs: 30,
            probe_timeout_ms: 2000,
        }
    }
}

impl BackendConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl PreviewConfig {
    pub fn options(&self) -> PreviewOptions {
        PreviewOptions::quote_aware(self.quote_aware)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            backend: BackendConfig {
                url: lookup("BACKEND_URL")
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty()),
                live: var("BACKEND_LIVE", "false")
                    .parse()
                    .context("BACKEND_LIVE must be true or false")?,
                probe: var("BACKEND_PROBE", "false")
                    .parse()
                    .context("BACKEND_PROBE must be true or false")?,
                timeout_secs: var("BACKEND_TIMEOUT_SECS", "30")
                    .parse()
                    .context("BACKEND_TIMEOUT_SECS must be a whole number of seconds")?,
                probe_timeout_ms: var("BACKEND_PROBE_TIMEOUT_MS", "2000")
                    .parse()
                    .context("BACKEND_PROBE_TIMEOUT_MS must be a whole number of milliseconds")?,
            },
            preview: PreviewConfig {
                quote_aware: var("PREVIEW_QUOTE_AWARE", "false")
                    .parse()
                    .context("PREVIEW_QUOTE_AWARE must be true or false")?,
            },
            logging: LoggingConfig {
                dir: lookup("DATACHAT_LOG_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_log_dir),
            },
        })
    }
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("datachat").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
