//! Configuration management for magpie.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/magpie/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database location settings
    pub storage: StorageConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Per-site scrape settings, keyed by site name
    pub sites: HashMap<String, SiteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut sites = HashMap::new();
        sites.insert("seek".to_string(), SiteConfig::default());
        Self {
            storage: StorageConfig::default(),
            browser: BrowserConfig::default(),
            sites,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MAGPIE_HEADLESS`: Override browser headless mode (true/false)
    /// - `MAGPIE_DATABASE`: Override the database file path
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("MAGPIE_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("MAGPIE_DATABASE") {
            config.storage.database_path = Some(PathBuf::from(&val));
            tracing::debug!("Override storage.database_path from env: {}", val);
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Look up the configuration for a named site.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownSite` if no entry exists for the name.
    pub fn site(&self, name: &str) -> ConfigResult<&SiteConfig> {
        self.sites
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSite(name.to_string()))
    }

    /// Resolve the database file path, defaulting to the data directory.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("magpie.db")),
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/magpie/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "magpie", "magpie").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/magpie`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "magpie", "magpie").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Database location settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path; defaults to `<data dir>/magpie.db` when unset
    pub database_path: Option<PathBuf>,
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
    /// How long to let a page settle after navigation before reading content
    pub settle_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            settle_ms: 750,
        }
    }
}

/// Per-site scrape settings.
///
/// The delay/concurrency numbers seed the rate limiter; `page_size` is the
/// source's full-page record count that signals further pages exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL all listing paths are joined against
    pub base_url: String,
    /// Path segment for category traversal
    pub category: String,
    /// Path segment for filter traversal
    pub filter: String,
    /// Location path segment appended to either traversal path
    pub location: String,
    /// Minimum delay between request starts, in seconds
    pub min_delay: f64,
    /// Maximum delay between request starts, in seconds
    pub max_delay: f64,
    /// Maximum concurrent in-flight requests
    pub max_concurrent: u32,
    /// Records on a full listing page; a shorter page is the last one
    pub page_size: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.seek.co.nz/".to_string(),
            category: "jobs-in-information-communication-technology".to_string(),
            filter: "developer-jobs".to_string(),
            location: "in-All-New-Zealand".to_string(),
            min_delay: 2.0,
            max_delay: 4.0,
            max_concurrent: 2,
            page_size: 22,
        }
    }
}
