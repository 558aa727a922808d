use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::clipboard::detect::BackendPreference;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Backend to use instead of detecting one from the platform
    #[serde(default)]
    pub backend: BackendPreference,

    /// How long to wait for another process to release the Windows clipboard
    #[serde(default = "default_open_timeout_ms")]
    pub open_timeout_ms: u64,

    /// Text encoding for the CLI `--text` mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl GeneralConfig {
    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            backend: BackendPreference::default(),
            open_timeout_ms: default_open_timeout_ms(),
            encoding: None,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level written (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to this file (rotated daily) instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            file: None,
        }
    }
}

// Default value functions for serde
fn default_open_timeout_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Location of the configuration file
///
/// `$ANYCLIP_CONFIG`, else `$XDG_CONFIG_HOME/anyclip/anyclip.toml`,
/// else `~/.config/anyclip/anyclip.toml`
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var("ANYCLIP_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let config_dir = if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("anyclip")
    } else {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .context("HOME environment variable not set")?;
        PathBuf::from(home).join(".config/anyclip")
    };

    Ok(config_dir.join("anyclip.toml"))
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        // Missing file means defaults
        if !self.path.exists() {
            log::debug!("Config file not found at {:?}, using defaults", self.path);
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::debug!(
            "Loaded configuration from {:?}: backend={:?}, open_timeout_ms={}",
            self.path,
            config.general.backend,
            config.general.open_timeout_ms
        );

        Ok(config)
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        if self.path.exists() {
            log::info!("Configuration already exists at {:?}", self.path);
            return Ok(());
        }

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../anyclip.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}
