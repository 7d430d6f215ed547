//! Client identity used as the rate limiter key.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Extracts the caller's IP address as a string key.
///
/// Uses the peer socket address, or, when [`AppState::behind_proxy`] is set,
/// the first entry of `X-Forwarded-For` (then `X-Real-IP`) with the peer
/// address as fallback.
///
/// Requires the router to be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        resolve_client_key(&parts.headers, peer, state.behind_proxy)
            .map(ClientKey)
            .ok_or_else(|| AppError::internal("Client address unavailable", json!({})))
    }
}

/// Picks the client key from forwarding headers or the peer address.
///
/// Forwarding headers are ignored unless `behind_proxy` is true, and entries
/// that do not parse as an IP address are skipped.
pub fn resolve_client_key(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    behind_proxy: bool,
) -> Option<String> {
    if behind_proxy {
        let forwarded = forwarded_ip(headers, "x-forwarded-for")
            .or_else(|| forwarded_ip(headers, "x-real-ip"));
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    peer.map(|ip| ip.to_string())
}

fn forwarded_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}
