//! API request and response types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[cfg(feature = "validation")]
use garde::Validate;

// ============================================================================
// Version API Types
// ============================================================================

/// Application version as reported by `GET /api/v1/version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct VersionResponse {
    /// Informational version, e.g. `1.4.0` or `0.0.0-dev`
    #[cfg_attr(feature = "openapi", schema(example = "1.4.0"))]
    #[cfg_attr(feature = "validation", garde(length(min = 1)))]
    pub version: String,
}

impl VersionResponse {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
