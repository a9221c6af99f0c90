//! Client signal extraction from request headers.

use std::net::IpAddr;

use actix_web::HttpRequest;
use actix_web::http::header;

use crate::domain::FetchSignals;

/// Capture the signals the classifier consumes from one request.
///
/// The client address is resolved from a prioritized chain: the CDN's
/// `CF-Connecting-IP`, then the first hop of `X-Forwarded-For`, then the
/// peer address of the connection itself. Anything that does not parse as
/// an address is skipped, and when the whole chain comes up empty the
/// address is absent rather than an empty value.
pub fn fetch_signals(req: &HttpRequest) -> FetchSignals {
    FetchSignals {
        user_agent: header_text(req, header::USER_AGENT.as_str()),
        client_ip: resolve_client_ip(req),
        via: header_text(req, "via"),
    }
}

fn header_text(req: &HttpRequest, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn resolve_client_ip(req: &HttpRequest) -> Option<IpAddr> {
    cdn_address(req)
        .or_else(|| forwarded_first_hop(req))
        .or_else(|| req.peer_addr().map(|addr| addr.ip()))
}

fn cdn_address(req: &HttpRequest) -> Option<IpAddr> {
    parse_ip(req.headers().get("cf-connecting-ip")?.to_str().ok())
}

fn forwarded_first_hop(req: &HttpRequest) -> Option<IpAddr> {
    let chain = req.headers().get("x-forwarded-for")?.to_str().ok()?;
    parse_ip(chain.split(',').next())
}

fn parse_ip(value: Option<&str>) -> Option<IpAddr> {
    value?.trim().parse().ok()
}
