use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::{DATE_FALLBACK_DAYS, MIN_CANDIDATE_CHARS};
use crate::common::error::{Result, ScraperError};
use crate::normalize::YearPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererBackend {
    Http,
    Chromium,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: RendererBackend,
    pub timeout_ms: u64,
    pub settle_ms: u64,
    pub wait_until_idle: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: RendererBackend::Http,
            timeout_ms: 30_000,
            settle_ms: 3_000,
            wait_until_idle: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub include_recurring: bool,
    pub fallback_days: i64,
    pub year_policy: YearPolicy,
    pub min_candidate_chars: usize,
    pub catalog_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            include_recurring: false,
            fallback_days: DATE_FALLBACK_DAYS,
            year_policy: YearPolicy::RollForward,
            min_candidate_chars: MIN_CANDIDATE_CHARS,
            catalog_path: None,
        }
    }
}

impl Config {
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    /// Loads the file when present; a missing file yields the defaults
    pub fn load_or_default(config_path: impl AsRef<Path>) -> Result<Self> {
        if config_path.as_ref().exists() {
            Self::load(config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.pipeline.fallback_days < 0 {
            return Err(ScraperError::Config(
                "pipeline.fallback_days must not be negative".to_string(),
            ));
        }
        Ok(config)
    }
}
