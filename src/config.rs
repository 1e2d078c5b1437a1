//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config` / `SIVACOR_CONFIG`, else `$XDG_CONFIG_HOME/sivacor/sivacor.toml`
//! 3. Environment variables: `SIVACOR_*` prefix
//! 4. `GIRDER_API_URL` and `GIRDER_API_KEY`
//!
//! The API key is only ever taken from `GIRDER_API_KEY`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::application::ApplicationError;
use crate::infrastructure::girder::DEFAULT_PAGE_SIZE;
use crate::util::path::expand_path;

/// Default SIVACOR Girder endpoint.
pub const DEFAULT_API_URL: &str = "https://girder.sivacor.org/api/v1";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GIRDER_API_KEY";

/// Environment variable overriding the API URL.
pub const API_URL_VAR: &str = "GIRDER_API_URL";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<usize>,
}

/// Unified configuration for sivacor.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Girder REST base URL
    pub api_url: String,
    /// Girder API key (environment only)
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Records per page for listing endpoints
    pub page_size: usize,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Get the XDG config directory for sivacor.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sivacor").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sivacor.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            api_key: self.api_key.clone(),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            page_size: overlay.page_size.unwrap_or(self.page_size),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given.
    ///   Without it the XDG config file is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        match config_file {
            Some(path) => {
                let path = &expand_path(path);
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        // 3. SIVACOR_* overrides
        current = Self::apply_env_overrides(current)?;

        // 4. Girder variables
        current = current.apply_girder_env(|name| std::env::var(name).ok());

        current.validate()?;
        Ok(current)
    }

    /// Apply SIVACOR_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("SIVACOR")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("api_url") {
            settings.api_url = val;
        }
        if let Ok(val) = config.get_string("timeout_secs") {
            settings.timeout_secs = parse_number("SIVACOR_TIMEOUT_SECS", &val)?;
        }
        if let Ok(val) = config.get_string("page_size") {
            settings.page_size = parse_number("SIVACOR_PAGE_SIZE", &val)?;
        }

        Ok(settings)
    }

    /// Apply `GIRDER_API_URL` and `GIRDER_API_KEY` from `lookup`.
    ///
    /// Empty values count as unset.
    pub fn apply_girder_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(API_URL_VAR) {
            self.api_url = url;
        }
        self.api_key = non_empty(API_KEY_VAR);
        self
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.page_size == 0 {
            return Err(ApplicationError::Config {
                message: "page_size must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "timeout_secs must be at least 1".into(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ApplicationError> {
    raw.trim().parse().map_err(|_| ApplicationError::Config {
        message: format!("{name}: expected a number, got '{raw}'"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
