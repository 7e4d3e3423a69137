//! AHKFlow backend library.
//!
//! This module exposes the application builder for use in tests.

use ahkflow_types::VERSION_ROUTE;
use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod logging;
pub mod openapi;
pub mod state;
pub mod tls;
pub mod version;

use state::AppState;

/// Create the Axum application router.
///
/// Any origin is allowed. This function is used by integration tests and by
/// callers that do not need a CORS policy.
pub fn create_app(state: AppState) -> Router {
    create_app_with_config(state, &[])
}

/// Create the Axum application router with the given CORS origins.
///
/// If `cors_allowed_origins` is empty, any origin is allowed.
/// Otherwise, only the specified origins are allowed, with credentials.
/// Any request method and header is allowed in both cases.
pub fn create_app_with_config(state: AppState, cors_allowed_origins: &[String]) -> Router {
    let swagger_router = Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
    );

    Router::new()
        .route("/health", get(health))
        .route(
            VERSION_ROUTE,
            get(api::version::get_version)
                .layer(CatchPanicLayer::custom(api::version::handle_panic)),
        )
        .merge(swagger_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allowed_origins))
        .with_state(state)
}

fn cors_layer(cors_allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    if cors_allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        cors.allow_origin(origins).allow_credentials(true)
    }
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}
