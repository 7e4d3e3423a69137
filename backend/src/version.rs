//! Version information embedded at compile time.
//!
//! `build.rs` exports the informational version of the build as
//! `AHKFLOW_INFORMATIONAL_VERSION`. Builds without version metadata report
//! [`SENTINEL_VERSION`] instead of failing.

use ahkflow_types::SENTINEL_VERSION;
use async_trait::async_trait;

/// Informational version embedded by the build script, if any.
const EMBEDDED_VERSION: Option<&str> = option_env!("AHKFLOW_INFORMATIONAL_VERSION");

/// Error type for version lookups.
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("Version lookup failed: {0}")]
    Lookup(String),
}

pub type Result<T> = std::result::Result<T, VersionError>;

/// Source of the application version served by the API.
#[async_trait]
pub trait VersionService: Send + Sync {
    /// Get the current application version.
    async fn get_version(&self) -> Result<String>;
}

/// Version service backed by the metadata compiled into this binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildVersionService;

impl BuildVersionService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VersionService for BuildVersionService {
    async fn get_version(&self) -> Result<String> {
        Ok(informational_version())
    }
}

/// Get the informational version of this build.
pub fn informational_version() -> String {
    resolve_informational_version(EMBEDDED_VERSION)
}

/// Resolve an embedded version string, substituting the sentinel when it is
/// missing or blank.
pub fn resolve_informational_version(embedded: Option<&str>) -> String {
    embedded
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(SENTINEL_VERSION)
        .to_string()
}

/// Whether this build carries real version metadata.
pub fn has_embedded_version() -> bool {
    EMBEDDED_VERSION.is_some_and(|v| !v.trim().is_empty())
}
