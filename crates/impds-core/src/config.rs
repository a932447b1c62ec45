//! Configuration management for the lookup service.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// Loaded from `~/.config/impds-dedup/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream portal settings
    pub portal: PortalConfig,
    /// External login subprocess settings
    pub login: LoginConfig,
    /// Session freshness settings
    pub session: SessionConfig,
    /// Search retry/timeout settings
    pub search: SearchConfig,
    /// Identifier codec settings
    pub crypto: CryptoConfig,
    /// Local HTTP server settings
    pub server: ServerConfig,
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
    /// - `IMPDS_PORTAL_URL`: Override the portal base URL
    /// - `IMPDS_SHARED_PASSPHRASE`: Override the codec shared passphrase
    /// - `IMPDS_SERVER_PORT`: Override the local server port
    /// - `IMPDS_FALLBACK_TOKEN_FILE`: Override the cached token file path
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("IMPDS_PORTAL_URL") {
            if !val.is_empty() {
                tracing::debug!("Override portal.base_url from env");
                config.portal.base_url = val;
            }
        }

        if let Ok(val) = std::env::var("IMPDS_SHARED_PASSPHRASE") {
            if !val.is_empty() {
                tracing::debug!("Override crypto.shared_passphrase from env");
                config.crypto.shared_passphrase = val;
            }
        }

        if let Ok(val) = std::env::var("IMPDS_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                tracing::debug!("Override server.port from env: {}", port);
                config.server.port = port;
            }
        }

        if let Ok(val) = std::env::var("IMPDS_FALLBACK_TOKEN_FILE") {
            if !val.is_empty() {
                tracing::debug!("Override login.fallback_token_file from env");
                config.login.fallback_token_file = PathBuf::from(val);
            }
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

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/impds-dedup/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("in", "impds-tools", "impds-dedup").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Upstream portal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL of the deduplication portal
    pub base_url: String,
    /// User agent sent with outbound requests
    pub user_agent: String,
}

impl PortalConfig {
    /// Full URL of the search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://impds.nic.in/impdsdeduplication".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// External login subprocess settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Command used to perform the credential exchange
    pub command: String,
    /// Arguments passed to the command
    pub args: Vec<String>,
    /// Maximum login attempts before falling back to the cached token
    pub max_retries: u32,
    /// Delay between login attempts in milliseconds
    pub retry_delay_ms: u64,
    /// File the login subprocess writes the token to on success
    pub fallback_token_file: PathBuf,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_string(),
            args: vec!["impds_auth.py".to_string()],
            max_retries: 5,
            retry_delay_ms: 3000,
            fallback_token_file: PathBuf::from("session.txt"),
        }
    }
}

/// Session freshness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum session age in minutes before renewal is required
    pub freshness_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            freshness_minutes: 30,
        }
    }
}

/// Search retry and timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum retries after a session-expiry signal
    pub max_retries: u32,
    /// Delay between expiry retries in milliseconds
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 2000,
            timeout_secs: 30,
        }
    }
}

/// Identifier codec settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Shared passphrase the identifier key is derived from.
    ///
    /// Must match on every party that needs to decode identifiers; override
    /// via `IMPDS_SHARED_PASSPHRASE` in deployments.
    pub shared_passphrase: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            shared_passphrase: "impds#dedup-dev-passphrase".to_string(),
        }
    }
}

/// Local HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the JSON API listens on
    pub port: u16,
    /// Startup initialization attempts before giving up
    pub init_max_retries: u32,
    /// Delay between startup attempts in seconds
    pub init_retry_delay_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            init_max_retries: 10,
            init_retry_delay_secs: 5,
        }
    }
}
