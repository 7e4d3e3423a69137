//! Version API endpoint.

use ahkflow_types::api::{ErrorResponse, VersionResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use std::any::Any;
use tracing::{debug, error};

use crate::state::AppState;

/// Message returned to callers on any failure. Never carries internal detail.
pub const VERSION_ERROR_MESSAGE: &str =
    "An unexpected error occurred while retrieving the application version.";

/// Get the application version.
///
/// Returns the informational version embedded into the server at build time,
/// or `0.0.0-dev` for builds without version metadata.
#[utoipa::path(
    get,
    path = "/api/v1/version",
    tag = "System",
    responses(
        (status = 200, description = "Application version", body = VersionResponse),
        (status = 500, description = "Version lookup failed", body = ErrorResponse)
    )
)]
pub async fn get_version(
    State(state): State<AppState>,
) -> Result<Json<VersionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let version = state
        .version_service()
        .get_version()
        .await
        .map_err(|e| {
            error!("{} {}", VERSION_ERROR_MESSAGE, e);
            internal_error()
        })?;

    let response = VersionResponse::new(version);
    if let Err(report) = response.validate() {
        error!("{} Invalid version: {}", VERSION_ERROR_MESSAGE, report);
        return Err(internal_error());
    }

    debug!("Serving version {}", response.version);
    Ok(Json(response))
}

/// Turn a panic raised while serving the version into a generic 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("{} Handler panicked: {}", VERSION_ERROR_MESSAGE, detail);

    internal_error().into_response()
}

fn internal_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(VERSION_ERROR_MESSAGE)),
    )
}
