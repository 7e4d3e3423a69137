//! Shared types for the AHKFlow web API.
//!
//! This crate contains the wire types and route constants shared between
//! the backend and frontend components.

/// Default port for the AHKFlow backend server.
pub const DEFAULT_PORT: u16 = 7600;

/// Version reported when the build carries no informational version.
pub const SENTINEL_VERSION: &str = "0.0.0-dev";

/// Version endpoint, relative to the API base address.
pub const VERSION_PATH: &str = "api/v1/version";

/// Version endpoint as mounted on the server router.
pub const VERSION_ROUTE: &str = "/api/v1/version";

pub mod api;

pub use api::{ErrorResponse, VersionResponse};
