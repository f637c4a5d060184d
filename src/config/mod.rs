use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod catalog;
pub mod defaults;
pub mod duration_serde;

pub use catalog::{ChannelCatalog, OrderedGroups};
use defaults::*;

/// Runtime configuration
///
/// Every section is optional; a missing file or section falls back to the
/// values in [`defaults`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub artwork: ArtworkConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub coverage: CoverageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Channel catalog file (`.toml` or `.json`)
    pub path: Option<PathBuf>,
    /// Group assigned to channels no category lists
    #[serde(default = "default_group")]
    pub default_group: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_group: default_group(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtworkConfig {
    #[serde(default = "default_artwork_enabled")]
    pub enabled: bool,
    /// Candidate URL templates; `{name}` is replaced with the standard name
    #[serde(default = "default_artwork_templates")]
    pub templates: Vec<String>,
    #[serde(default = "default_probe_timeout", with = "duration_serde::duration")]
    pub probe_timeout: Duration,
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            enabled: default_artwork_enabled(),
            templates: default_artwork_templates(),
            probe_timeout: default_probe_timeout(),
            max_concurrent_probes: default_max_concurrent_probes(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// EPG URL written to the `x-tvg-url` header of generated playlists
    #[serde(default = "default_epg_url")]
    pub epg_url: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            epg_url: default_epg_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default = "default_operators")]
    pub operators: Vec<String>,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            operators: default_operators(),
        }
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}

fn default_artwork_enabled() -> bool {
    DEFAULT_ARTWORK_ENABLED
}

fn default_artwork_templates() -> Vec<String> {
    DEFAULT_ARTWORK_TEMPLATES.iter().map(|t| t.to_string()).collect()
}

fn default_probe_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_PROBE_TIMEOUT).unwrap_or(Duration::from_secs(5))
}

fn default_max_concurrent_probes() -> usize {
    DEFAULT_MAX_CONCURRENT_PROBES
}

fn default_user_agent() -> String {
    DEFAULT_PROBE_USER_AGENT.to_string()
}

fn default_epg_url() -> String {
    DEFAULT_EPG_URL.to_string()
}

fn default_operators() -> Vec<String> {
    DEFAULT_OPERATORS.iter().map(|o| o.to_string()).collect()
}

impl Config {
    /// Load from `CONFIG_FILE`, else `config.toml`
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load_from_file(config_file: impl AsRef<Path>) -> Result<Self> {
        let config_file = config_file.as_ref();
        if config_file.exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            info!("Configuration loaded from: {}", config_file.display());
            Ok(config)
        } else {
            info!(
                "Config file {} not found, using defaults",
                config_file.display()
            );
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.artwork.max_concurrent_probes == 0 {
            return Err(AppError::configuration(
                "artwork.max_concurrent_probes must be at least 1",
            ));
        }
        if self.artwork.enabled && self.artwork.templates.is_empty() {
            return Err(AppError::configuration(
                "artwork.templates must not be empty when artwork is enabled",
            ));
        }
        Ok(())
    }

    /// Load the configured catalog, or an empty one when none is configured
    pub fn load_catalog(&self) -> AppResult<ChannelCatalog> {
        match &self.catalog.path {
            Some(path) => ChannelCatalog::load(path),
            None => Ok(ChannelCatalog::default()),
        }
    }
}
