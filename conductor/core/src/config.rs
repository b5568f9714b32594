//! TOML Configuration File Support
//!
//! Startup configuration for the exchange endpoint and the catalog source,
//! read from `~/.config/wisdom/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The endpoint has no default: a configuration that never names one fails
//! with [`ConfigError::MissingEndpoint`].
//!
//! # Environment Variables
//!
//! - `WISDOM_API_URL` - exchange endpoint URL
//! - `WISDOM_REQUEST_TIMEOUT` - request timeout in seconds (0 = none)
//! - `WISDOM_CATALOG` - path to a catalog TOML file
//!
//! # Example Configuration
//!
//! ```toml
//! [exchange]
//! endpoint = "https://example.com/api/chat"
//! request_timeout_secs = 60
//!
//! [catalog]
//! path = "/home/me/figures.toml"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};

/// Environment variable naming the endpoint
pub const ENV_API_URL: &str = "WISDOM_API_URL";
/// Environment variable holding the request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "WISDOM_REQUEST_TIMEOUT";
/// Environment variable naming a catalog file
pub const ENV_CATALOG: &str = "WISDOM_CATALOG";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// No endpoint given by any source
    #[error("No exchange endpoint configured (set WISDOM_API_URL, --api-url, or [exchange] endpoint)")]
    MissingEndpoint,

    /// Endpoint is not an http(s) URL
    #[error("Invalid exchange endpoint {url:?}: {reason}")]
    InvalidEndpoint {
        /// The value as given
        url: String,
        /// What is wrong with it
        reason: String,
    },

    /// Catalog file could not be read or parsed
    #[error("Failed to load catalog from {path}: {source}")]
    Catalog {
        /// Catalog file path
        path: PathBuf,
        /// The underlying catalog error
        source: CatalogError,
    },
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Exchange section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeToml {
    /// Endpoint URL
    pub endpoint: Option<String>,

    /// Request timeout in seconds (0 = no timeout)
    pub request_timeout_secs: Option<u64>,
}

/// Catalog section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogToml {
    /// Path to a catalog file replacing the built-in figures
    pub path: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WisdomToml {
    /// Exchange configuration section
    pub exchange: ExchangeToml,

    /// Catalog configuration section
    pub catalog: CatalogToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved startup configuration
#[derive(Clone, Debug)]
pub struct WisdomConfig {
    /// Exchange endpoint, fixed for the life of the process
    pub endpoint: Url,

    /// Transport timeout per request; `None` waits indefinitely
    pub request_timeout: Option<Duration>,

    /// Catalog file; `None` uses the built-in catalog
    pub catalog_path: Option<PathBuf>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Where the endpoint came from
    endpoint_source: ConfigSource,
}

impl WisdomConfig {
    /// Configuration for a known endpoint with every other value defaulted
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            request_timeout: None,
            catalog_path: None,
            config_file_path: None,
            endpoint_source: ConfigSource::Default,
        }
    }

    /// Where the endpoint came from
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.endpoint_source
    }

    /// Load the configured catalog, or the built-in one
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn load_catalog(&self) -> Result<Catalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::builtin());
        };

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let catalog = Catalog::from_toml_str(&content).map_err(|e| ConfigError::Catalog {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(
            path = %path.display(),
            figures = catalog.len(),
            "Loaded catalog from file"
        );
        Ok(catalog)
    }
}

/// Validate an endpoint string
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] unless `value` is an absolute
/// `http` or `https` URL.
pub fn parse_endpoint(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        url: value.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            url: value.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/wisdom/config.toml` or
/// `~/.config/wisdom/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wisdom").join("config.toml"))
}

/// Load configuration from the default path and the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if no
/// valid endpoint is configured. A missing config file is not an error.
pub fn load_config() -> Result<WisdomConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the environment
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, or if no
/// valid endpoint is configured.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<WisdomConfig, ConfigError> {
    load_config_with(path, &ConfigOverrides::default())
}

/// Load configuration from a path, the environment and CLI overrides
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed, or if no
/// valid endpoint is configured.
pub fn load_config_with(
    path: Option<PathBuf>,
    overrides: &ConfigOverrides,
) -> Result<WisdomConfig, ConfigError> {
    resolve(path, overrides, |key| std::env::var(key).ok())
}

/// Values gathered from every layer before validation
#[derive(Debug, Default)]
struct Layered {
    endpoint: Option<(String, ConfigSource)>,
    request_timeout_secs: Option<u64>,
    catalog_path: Option<PathBuf>,
    config_file_path: Option<PathBuf>,
}

fn resolve(
    path: Option<PathBuf>,
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<WisdomConfig, ConfigError> {
    let mut layered = Layered::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: WisdomToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut layered, toml_config);

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
            layered.config_file_path = Some(config_path);
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut layered, env);
    overrides.apply(&mut layered);

    let (raw_endpoint, endpoint_source) = layered.endpoint.ok_or(ConfigError::MissingEndpoint)?;
    let endpoint = parse_endpoint(&raw_endpoint)?;

    tracing::debug!(
        endpoint = %endpoint,
        source = %endpoint_source,
        "Resolved exchange endpoint"
    );

    Ok(WisdomConfig {
        endpoint,
        request_timeout: layered
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        catalog_path: layered.catalog_path,
        config_file_path: layered.config_file_path,
        endpoint_source,
    })
}

fn apply_toml_config(layered: &mut Layered, toml: WisdomToml) {
    if let Some(endpoint) = toml.exchange.endpoint {
        layered.endpoint = Some((endpoint, ConfigSource::File));
    }
    if let Some(secs) = toml.exchange.request_timeout_secs {
        layered.request_timeout_secs = Some(secs);
    }
    if let Some(path) = toml.catalog.path {
        layered.catalog_path = Some(path);
    }
}

fn apply_env_config(layered: &mut Layered, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        layered.endpoint = Some((url, ConfigSource::Env));
    }
    if let Some(timeout) = env(ENV_REQUEST_TIMEOUT) {
        match timeout.trim().parse::<u64>() {
            Ok(secs) => layered.request_timeout_secs = Some(secs),
            Err(_) => tracing::warn!(
                value = %timeout,
                "Ignoring unparsable WISDOM_REQUEST_TIMEOUT"
            ),
        }
    }
    if let Some(path) = env(ENV_CATALOG).filter(|v| !v.is_empty()) {
        layered.catalog_path = Some(PathBuf::from(path));
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for CLI overrides, the highest-priority layer
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Endpoint URL override
    pub api_url: Option<String>,

    /// Catalog file override
    pub catalog_path: Option<PathBuf>,

    /// Request timeout override (seconds, 0 = none)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Set catalog file override
    #[must_use]
    pub fn with_catalog_path(mut self, path: PathBuf) -> Self {
        self.catalog_path = Some(path);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    fn apply(&self, layered: &mut Layered) {
        if let Some(url) = &self.api_url {
            layered.endpoint = Some((url.clone(), ConfigSource::Cli));
        }
        if let Some(path) = &self.catalog_path {
            layered.catalog_path = Some(path.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            layered.request_timeout_secs = Some(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
