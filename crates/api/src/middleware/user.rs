//! Request identity extractor for Axum handlers.
//!
//! User resolution happens upstream of this service; the resolved user id
//! arrives in the `X-User-Id` header. Client address and user agent are
//! captured alongside it for the audit trail.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use tasklog_core::audit::Actor;
use tasklog_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// The acting user of a request, with provenance.
///
/// ```ignore
/// async fn my_handler(RequestUser(actor): RequestUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %actor.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestUser(pub Actor);

impl FromRequestParts<AppState> for RequestUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = header_str(&parts.headers, USER_ID_HEADER)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Missing X-User-Id header".into()))
            })?;

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip_address = client_ip(&parts.headers, peer);
        let user_agent = header_str(&parts.headers, USER_AGENT.as_str()).map(str::to_string);

        Ok(RequestUser(
            Actor::new(user_id).with_provenance(ip_address, user_agent),
        ))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// First `X-Forwarded-For` entry, else the socket peer address.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    header_str(headers, FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
