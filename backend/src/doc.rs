//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the tracking surface. Registered paths cover the pixel, the redirect,
//! and the health probes; the only schema is the health counts payload.

use utoipa::OpenApi;

use crate::inbound::http::health::StorageCountsResponse;

/// OpenAPI document for the tracking API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Beacon engagement API",
        description = "Pixel and click tracking endpoints with health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::tracking::open_pixel,
        crate::inbound::http::tracking::click_redirect,
        crate::inbound::http::health::health,
        crate::inbound::http::health::live,
    ),
    components(schemas(StorageCountsResponse)),
    tags(
        (name = "tracking", description = "Engagement signal collection"),
        (name = "health", description = "Probes for orchestration")
    )
)]
pub struct ApiDoc;
