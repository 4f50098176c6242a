//! Configuration management for Lookout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. This is the single source of the cache
//! lifetime; nothing else hardcodes a TTL.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/lookout/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Result cache settings
    pub cache: CacheConfig,
    /// Outbound probe settings
    pub probing: ProbingConfig,
    /// Log filter settings
    pub logging: LoggingConfig,
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
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(config_path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
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
    /// - `LOOKOUT_CACHE_TTL_SECS`: Override the cache lifetime
    /// - `LOOKOUT_CACHE_PATH`: Override the cache database location
    /// - `LOOKOUT_PROBE_TIMEOUT_SECS`: Override the per-probe timeout
    /// - `LOOKOUT_LOG_FILTER`: Override the log filter
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `LOOKOUT_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LOOKOUT_CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.cache.ttl_secs = secs;
                tracing::debug!("Override cache.ttl_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("LOOKOUT_CACHE_PATH") {
            if !val.is_empty() {
                tracing::debug!("Override cache.path from env: {}", val);
                self.cache.path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("LOOKOUT_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.probing.timeout_secs = secs;
                tracing::debug!("Override probing.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("LOOKOUT_LOG_FILTER") {
            if !val.is_empty() {
                self.logging.filter = val;
            }
        }
    }

    /// Check values that would make the engine misbehave.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for a zero probe timeout or an empty
    /// user agent.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probing.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probing.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.probing.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "probing.user_agent".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        Ok(())
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

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/lookout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "lookout", "lookout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/lookout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "lookout", "lookout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the cache directory path.
    ///
    /// Uses XDG base directories: `~/.cache/lookout`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "lookout", "lookout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.cache_dir().to_path_buf())
    }

    /// Location of the cache database: the configured path, or
    /// `cache.db` inside the XDG cache directory.
    pub fn cache_db_path(&self) -> ConfigResult<PathBuf> {
        match &self.cache.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::cache_dir()?.join("cache.db")),
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether results are cached at all
    pub enabled: bool,
    /// Maximum age of a fresh entry, in seconds
    pub ttl_secs: u64,
    /// Database file; defaults to the XDG cache directory
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    /// TTL as a `Duration`.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            path: None,
        }
    }
}

/// Outbound probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbingConfig {
    /// Per-probe timeout in seconds
    pub timeout_secs: u64,
    /// Whole-request deadline in seconds (0 = none)
    pub request_deadline_secs: u64,
    /// Cap on probes in flight per request (0 = all at once)
    pub max_concurrent_probes: usize,
    /// Maximum redirects followed per request
    pub max_redirects: usize,
    /// User agent string
    pub user_agent: String,
    /// Accept-Language header
    pub accept_language: String,
    /// Accept header
    pub accept: String,
}

impl ProbingConfig {
    /// Per-probe timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Request deadline, if one is configured.
    #[must_use]
    pub fn request_deadline(&self) -> Option<Duration> {
        (self.request_deadline_secs > 0).then(|| Duration::from_secs(self.request_deadline_secs))
    }

    /// Concurrency cap, if one is configured.
    #[must_use]
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent_probes > 0).then_some(self.max_concurrent_probes)
    }
}

impl Default for ProbingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            request_deadline_secs: 30,
            max_concurrent_probes: 0,
            max_redirects: 10,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            )
            .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
        }
    }
}

/// Log filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,lookout=debug".to_string(),
        }
    }
}
