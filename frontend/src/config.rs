//! API client configuration.

use reqwest::Url;
use std::time::Duration;

/// Base address used when none is configured.
pub const DEFAULT_API_BASE_ADDRESS: &str = "http://localhost:7600/";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the API base address.
pub const BASE_ADDRESS_VAR: &str = "AHKFLOW_API_BASE_ADDRESS";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_SECS_VAR: &str = "AHKFLOW_API_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base address is not an absolute http(s) URL
    InvalidBaseAddress(String),
    /// Timeout is not a positive number of seconds
    InvalidTimeout(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidBaseAddress(value) => {
                write!(f, "{} is not a valid http(s) URL: {}", BASE_ADDRESS_VAR, value)
            }
            ConfigError::InvalidTimeout(value) => {
                write!(
                    f,
                    "{} must be a positive number of seconds: {}",
                    TIMEOUT_SECS_VAR, value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the HTTP client that talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHttpClientOptions {
    /// Absolute base address; API paths are resolved relative to it
    pub base_address: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiHttpClientOptions {
    /// Create options for the given base address with the default timeout.
    pub fn new(base_address: &str) -> Result<Self, ConfigError> {
        Self::from_values(Some(base_address), None)
    }

    /// Build options from raw configuration values, applying defaults for
    /// missing ones.
    pub fn from_values(
        base_address: Option<&str>,
        timeout_secs: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let base_address = parse_base_address(base_address.unwrap_or(DEFAULT_API_BASE_ADDRESS))?;
        let timeout = match timeout_secs {
            Some(value) => parse_timeout(value)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_address,
            timeout,
        })
    }

    /// Read options from the process environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_address = std::env::var(BASE_ADDRESS_VAR).ok();
        let timeout_secs = std::env::var(TIMEOUT_SECS_VAR).ok();
        Self::from_values(base_address.as_deref(), timeout_secs.as_deref())
    }

    /// Read options baked in from the build environment.
    #[cfg(target_arch = "wasm32")]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            option_env!("AHKFLOW_API_BASE_ADDRESS"),
            option_env!("AHKFLOW_API_TIMEOUT_SECS"),
        )
    }
}

impl Default for ApiHttpClientOptions {
    fn default() -> Self {
        Self {
            base_address: Url::parse(DEFAULT_API_BASE_ADDRESS)
                .expect("default base address is a valid URL"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn parse_base_address(value: &str) -> Result<Url, ConfigError> {
    let trimmed = value.trim();
    let mut url =
        Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseAddress(value.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseAddress(value.to_string()));
    }

    // Relative joins replace the last path segment unless it ends with '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}
