use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::VisitorError;

const FORWARDED_FOR: &str = "x-forwarded-for";

impl From<VisitorError> for ApiError {
    fn from(err: VisitorError) -> Self {
        match err {
            VisitorError::Database(msg) => Self::DatabaseError(msg),
            VisitorError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// Accounts every request against the visitor counter before dispatch.
///
/// The resolved address and the visit outcome are recorded on the request
/// span opened by the logging middleware. A store failure fails the request.
/// Requests without a known peer address are passed through uncounted.
pub async fn visitor_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match client_ip(peer, request.headers(), &state.trusted_proxies) {
        Some(ip) => {
            let span = tracing::Span::current();
            span.record("client_ip", tracing::field::display(ip));
            let outcome = state.visitors.record(ip).await?;
            span.record("visit", outcome.as_str());
        }
        None => tracing::trace!("No client address, visit not counted"),
    }

    Ok(next.run(request).await)
}

/// Resolves the address a request is attributed to.
///
/// The socket peer is used unless it is a trusted proxy, in which case the
/// first parseable `X-Forwarded-For` entry wins.
#[must_use]
pub fn client_ip(
    peer: Option<IpAddr>,
    headers: &HeaderMap,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = peer?;

    if !trusted_proxies.contains(&peer.to_canonical()) {
        return Some(peer);
    }

    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    Some(forwarded.unwrap_or(peer))
}
