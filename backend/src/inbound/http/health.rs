//! Liveness probe and storage health surface.

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;

use crate::inbound::http::state::HttpState;

/// Stored-record totals reported by `/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageCountsResponse {
    /// Reconciled open records, one per engagement key.
    pub opens: i64,
    /// Click log entries.
    pub clicks: i64,
}

/// Liveness probe for orchestration and load balancers.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is alive")),
    tags = ["health"],
    operation_id = "live"
)]
#[get("/")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Storage health: record totals, or 503 when the store is unreachable.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Stored record totals", body = StorageCountsResponse),
        (status = 503, description = "Storage unreachable")
    ),
    tags = ["health"],
    operation_id = "health"
)]
#[get("/health")]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    match state.repository.counts().await {
        Ok(counts) => HttpResponse::Ok().json(StorageCountsResponse {
            opens: counts.opens,
            clicks: counts.clicks,
        }),
        Err(error) => {
            warn!(%error, "health check could not reach storage");
            HttpResponse::ServiceUnavailable().json(json!({ "error": error.to_string() }))
        }
    }
}
