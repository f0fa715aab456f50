//! Configuration management for contactfinder
//!
//! All configuration is loaded from `./config/contactfinder.toml`.
//! No hardcoded defaults exist in source code - all defaults are in the
//! config template. API tokens may be overridden with the
//! CONTACTFINDER_BOARD_TOKEN and CONTACTFINDER_PROVIDER_TOKEN environment
//! variables so the template can ship without secrets.

use serde::Deserialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/contactfinder.toml";

/// Default configuration file content - this is the ONLY place defaults exist
pub const DEFAULT_CONFIG: &str = include_str!("../config/contactfinder.toml");

pub const BOARD_TOKEN_ENV: &str = "CONTACTFINDER_BOARD_TOKEN";
pub const PROVIDER_TOKEN_ENV: &str = "CONTACTFINDER_PROVIDER_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0} (run with --init to create it)")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty{hint}")]
    EmptyRequired { field: String, hint: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub provider: ProviderConfig,
    pub lookup: LookupConfig,
    pub output: OutputConfig,
}

/// Address source board configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Board GraphQL endpoint
    pub api_url: String,
    /// Bearer token for the board API
    pub api_token: String,
    /// Board to pull address items from
    pub board_id: String,
    /// Maximum items fetched per run
    pub item_limit: usize,
}

/// Property data provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for property search, owner resolution, and contact lookup
    pub base_url: String,
    /// Bearer token for the provider API
    pub api_token: String,
    /// Per-request timeout in seconds (one bounded attempt, no retries)
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Contact lookup behavior
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Read-only endpoint suffixes probed under /persons/{key} when the
    /// primary contact endpoint has no cached data. Empty string means the
    /// person details endpoint itself.
    pub alternate_endpoints: Vec<String>,
    /// Pause between addresses in milliseconds
    pub pause_ms: u64,
}

/// Report output location
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output directory; empty means Desktop, falling back to the current
    /// directory
    pub directory: String,
    pub filename: String,
}

impl AppConfig {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load configuration from a specific path, applying environment token
    /// overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(BOARD_TOKEN_ENV) {
            if !token.is_empty() {
                self.board.api_token = token;
            }
        }
        if let Ok(token) = std::env::var(PROVIDER_TOKEN_ENV) {
            if !token.is_empty() {
                self.provider.api_token = token;
            }
        }
    }

    /// Validate the loaded configuration, rejecting malformed URLs and
    /// missing credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_url("board.api_url", &self.board.api_url)?;
        validate_url("provider.base_url", &self.provider.base_url)?;
        require_nonempty("board.board_id", &self.board.board_id, "")?;
        require_nonempty(
            "board.api_token",
            &self.board.api_token,
            &format!(" (or set {})", BOARD_TOKEN_ENV),
        )?;
        require_nonempty(
            "provider.api_token",
            &self.provider.api_token,
            &format!(" (or set {})", PROVIDER_TOKEN_ENV),
        )?;
        Ok(())
    }

    /// Write the default configuration template to `CONFIG_PATH`. Refuses to
    /// overwrite an existing file.
    pub fn create_default_config() -> Result<PathBuf, ConfigError> {
        let path = PathBuf::from(CONFIG_PATH);
        if path.exists() {
            return Err(ConfigError::IoError(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("configuration file already exists at {}", path.display()),
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok(path)
    }
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            url: url.to_string(),
        })
    }
}

fn require_nonempty(field: &str, value: &str, hint: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::EmptyRequired {
            field: field.to_string(),
            hint: hint.to_string(),
        })
    } else {
        Ok(())
    }
}
