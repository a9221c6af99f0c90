//! Tracking endpoints: the open pixel and the click redirect.
//!
//! ```text
//! GET /open.gif?subject=<id>&email=<pct-encoded>
//! GET /c?subject=<id>&email=<pct-encoded>&u=<pct-encoded-url>
//! ```
//!
//! Both responses are unconditional contracts: the pixel bytes and the
//! redirect are served whatever happens to recording. Parameter problems
//! and storage failures are logged and otherwise ignored here, at the
//! boundary.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, get, web};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::EngagementKey;
use crate::inbound::http::client_meta::fetch_signals;
use crate::inbound::http::state::HttpState;

/// Single transparent GIF pixel, served byte-for-byte on every open request.
pub const TRACKING_PIXEL: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0xff, 0xff,
    0xff, 0x00, 0x00, 0x00, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// Mail clients must refetch the pixel on every view.
pub const PIXEL_CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// Query parameters of the pixel endpoint. A stray `ts` cache-buster is
/// tolerated and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct OpenQuery {
    pub subject: Option<String>,
    pub email: Option<String>,
}

/// Query parameters of the redirect endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClickQuery {
    pub subject: Option<String>,
    pub email: Option<String>,
    pub u: Option<String>,
}

/// Serve the tracking pixel, recording an open as a side effect.
#[utoipa::path(
    get,
    path = "/open.gif",
    params(
        ("subject" = Option<String>, Query, description = "Integer id of the tracked subject"),
        ("email" = Option<String>, Query, description = "Percent-encoded recipient email")
    ),
    responses(
        (status = 200, description = "Transparent tracking pixel as image/gif")
    ),
    tags = ["tracking"],
    operation_id = "openPixel"
)]
#[get("/open.gif")]
pub async fn open_pixel(req: HttpRequest, state: web::Data<HttpState>) -> HttpResponse {
    let query = web::Query::<OpenQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();

    match tracking_key(query.subject.as_deref(), query.email.as_deref()) {
        Some(key) => {
            if let Err(error) = state.recorder.record_open(key, fetch_signals(&req)).await {
                warn!(%error, "open recording skipped");
            }
        }
        None => debug!("pixel requested without usable tracking parameters"),
    }

    pixel_response()
}

/// Redirect to the requested destination, recording the click first.
#[utoipa::path(
    get,
    path = "/c",
    params(
        ("subject" = Option<String>, Query, description = "Integer id of the tracked subject"),
        ("email" = Option<String>, Query, description = "Percent-encoded recipient email"),
        ("u" = Option<String>, Query, description = "Percent-encoded destination URL")
    ),
    responses(
        (status = 302, description = "Redirect to the decoded destination, `/` when absent")
    ),
    tags = ["tracking"],
    operation_id = "clickRedirect"
)]
#[get("/c")]
pub async fn click_redirect(req: HttpRequest, state: web::Data<HttpState>) -> HttpResponse {
    let query = web::Query::<ClickQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();
    let destination = decode_destination(query.u.as_deref());

    match tracking_key(query.subject.as_deref(), query.email.as_deref()) {
        Some(key) => {
            let recording = state
                .recorder
                .record_click(key, destination.clone(), fetch_signals(&req))
                .await;
            if let Err(error) = recording {
                warn!(%error, "click recording skipped");
            }
        }
        None => debug!("redirect requested without usable tracking parameters"),
    }

    redirect_response(&destination)
}

/// Build the engagement key when both parameters are usable: `subject` must
/// parse as an integer and the normalized recipient must be non-empty.
fn tracking_key(subject: Option<&str>, email: Option<&str>) -> Option<EngagementKey> {
    let subject = subject?.trim().parse::<i64>().ok()?;
    let key = EngagementKey::new(subject, email?);
    (!key.recipient().is_empty()).then_some(key)
}

/// Decode the destination parameter, falling back to the root path when the
/// parameter is absent or decodes to nothing.
fn decode_destination(raw: Option<&str>) -> String {
    let decoded = raw
        .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
        .unwrap_or_default();
    if decoded.trim().is_empty() {
        "/".to_owned()
    } else {
        decoded
    }
}

fn pixel_response() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("image/gif")
        .insert_header((header::CACHE_CONTROL, PIXEL_CACHE_CONTROL))
        .insert_header((header::PRAGMA, "no-cache"))
        .body(TRACKING_PIXEL.to_vec())
}

fn redirect_response(destination: &str) -> HttpResponse {
    // A destination that cannot be carried in a Location header falls back
    // to the root path instead of failing the response.
    let location = header::HeaderValue::from_str(destination)
        .unwrap_or_else(|_| header::HeaderValue::from_static("/"));
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
#[path = "tracking_tests.rs"]
mod tests;
