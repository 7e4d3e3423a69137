//! OpenAPI documentation configuration.

use ahkflow_types::api::{ErrorResponse, VersionResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::api::version::get_version),
    components(schemas(VersionResponse, ErrorResponse)),
    tags(
        (name = "System", description = "Application and build information")
    ),
    info(
        title = "AHKFlow API",
        description = "REST API reporting the running AHKFlow build",
        license(
            name = "MIT OR Apache-2.0"
        )
    )
)]
pub struct ApiDoc;
