//! Configuration management for diskmap
//!
//! Config file location:
//! - Linux: ~/.config/diskmap/config.toml
//! - macOS: ~/Library/Application Support/diskmap/config.toml
//! - Windows: %APPDATA%/diskmap/config.toml
//!
//! You can override the config location by setting `DISKMAP_CONFIG_PATH`.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::disk::QueryOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// System query settings
    #[serde(default)]
    pub query: QueryConfig,

    /// Polling behavior for `watch`
    #[serde(default)]
    pub poll: PollConfig,

    /// Output settings
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path; a missing file yields defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        Ok(config)
    }

    /// Save configuration to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, toml)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("DISKMAP_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("com", "diskmap", "diskmap")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Create default config file if it doesn't exist
    pub fn init() -> Result<(Self, bool)> {
        let config_path = Self::config_path()?;
        Self::init_at(&config_path)
    }

    /// Load the config at `config_path`, writing it out first if missing.
    /// The flag reports whether a new file was created.
    pub fn init_at(config_path: &Path) -> Result<(Self, bool)> {
        let config = Self::load_from(config_path)?;

        if config_path.exists() {
            return Ok((config, false));
        }

        config.save_to(config_path)?;
        Ok((config, true))
    }

    /// Query options derived from the `[query]` section.
    pub fn query_options(&self) -> QueryOptions {
        let program = self.query.wmic_path.trim();
        QueryOptions {
            program: if program.is_empty() {
                default_wmic_path()
            } else {
                program.to_string()
            },
            timeout: Duration::from_secs(self.query.timeout_seconds.max(1)),
        }
    }
}

/// System query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Per-query timeout in seconds; a query exceeding it is treated as failed
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Query tool executable
    #[serde(default = "default_wmic_path")]
    pub wmic_path: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            wmic_path: default_wmic_path(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_wmic_path() -> String {
    "wmic".to_string()
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Interval between polls in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Usage percentage at which a drive is flagged for attention
    #[serde(default = "default_warning_percent")]
    pub warning_percent: f64,

    /// Usage percentage at which a drive is flagged as nearly full
    #[serde(default = "default_danger_percent")]
    pub danger_percent: f64,

    /// Print JSON instead of a table by default
    #[serde(default)]
    pub json: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            warning_percent: default_warning_percent(),
            danger_percent: default_danger_percent(),
            json: false,
        }
    }
}

fn default_warning_percent() -> f64 {
    70.0
}

fn default_danger_percent() -> f64 {
    90.0
}

/// Get configuration file path for display purposes
pub fn get_config_path() -> Result<String> {
    let path = Config::config_path()?;
    Ok(path.display().to_string())
}
