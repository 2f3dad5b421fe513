// Dashboard configuration: YAML file under the user config directory,
// with environment overrides for the service address and password.

use crate::api::client::{DEFAULT_API_BASE, REQUEST_TIMEOUT_SECS};
use crate::dashboard::inspector::DEFAULT_BODY_PREVIEW_CHARS;
use crate::dashboard::rate::DEFAULT_SAMPLE_CAPACITY;
use crate::dashboard::toasts::ToastTimings;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "dashboard.yaml";
pub const ENV_API_BASE: &str = "TUNNELCOW_API_BASE";
pub const ENV_PASSWORD: &str = "TUNNELCOW_PASSWORD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub sample_capacity: usize,
    /// Attach a sequence number to each poll and drop completions that
    /// settle after a newer one was applied.
    pub discard_stale_polls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub bulk: BulkConfig,
    pub toasts: ToastConfig,
    pub inspector: InspectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    pub chunk_size: usize,
    pub pacing_ms: u64,
    pub teardown_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    pub enter_ms: u64,
    pub lifetime_ms: u64,
    pub exit_ms: u64,
    pub sweep_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub body_preview_chars: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            poll_interval_ms: 1_000,
            sample_capacity: DEFAULT_SAMPLE_CAPACITY,
            discard_stale_polls: false,
            password: None,
            bulk: BulkConfig::default(),
            toasts: ToastConfig::default(),
            inspector: InspectorConfig::default(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            pacing_ms: 50,
            teardown_ms: 500,
        }
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enter_ms: 10,
            lifetime_ms: 5_000,
            exit_ms: 400,
            sweep_interval_ms: 50,
        }
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            body_preview_chars: DEFAULT_BODY_PREVIEW_CHARS,
        }
    }
}

impl DashboardConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tunnelcow")
            .join(CONFIG_FILE_NAME)
    }

    /// Load from `path` (or the default location), apply environment
    /// overrides and validate. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Self = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            log::info!("[config] loaded from {}", path.display());
            config
        } else {
            log::info!("[config] no config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup(ENV_API_BASE).filter(|value| !value.trim().is_empty()) {
            self.api_base = api_base.trim().to_string();
        }
        if let Some(password) = lookup(ENV_PASSWORD).filter(|value| !value.is_empty()) {
            self.password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api_base)
            .with_context(|| format!("Invalid api_base '{}'", self.api_base))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api_base must be an http(s) URL, got '{}'", self.api_base);
        }
        if self.bulk.chunk_size == 0 {
            bail!("bulk.chunk_size must be at least 1");
        }
        if self.sample_capacity == 0 {
            bail!("sample_capacity must be at least 1");
        }
        if self.poll_interval_ms == 0 || self.toasts.sweep_interval_ms == 0 {
            bail!("poll and sweep intervals must be non-zero");
        }
        for (name, value) in [
            ("toasts.enter_ms", self.toasts.enter_ms),
            ("toasts.lifetime_ms", self.toasts.lifetime_ms),
            ("toasts.exit_ms", self.toasts.exit_ms),
        ] {
            if i64::try_from(value).is_err() {
                bail!("{} is out of range: {}", name, value);
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.toasts.sweep_interval_ms)
    }

    pub fn toast_timings(&self) -> ToastTimings {
        ToastTimings {
            enter_ms: saturating_millis(self.toasts.enter_ms),
            lifetime_ms: saturating_millis(self.toasts.lifetime_ms),
            exit_ms: saturating_millis(self.toasts.exit_ms),
        }
    }
}

fn saturating_millis(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl BulkConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn teardown(&self) -> Duration {
        Duration::from_millis(self.teardown_ms)
    }
}
