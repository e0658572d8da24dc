//! Read-only access to the identity markers carried by a request.
//!
//! The public marker is set by the edge proxy for traffic that originates
//! outside the private network. Caller and client identifiers are only
//! trustworthy after [`Authenticator::authenticate`](crate::Authenticator::authenticate)
//! has sanitized and re-populated them.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request};
use serde::Serialize;

pub const PUBLIC_HEADER: &str = "x-public";
pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Whether the request needs no authentication context.
///
/// An absent request is public. A present request is public only when the
/// public marker equals `"true"` exactly.
pub fn is_public<B>(request: Option<&Request<B>>) -> bool {
    request.map_or(true, |req| public_marker(req.headers()))
}

/// Caller identifier stamped on the request, or `0`.
///
/// `0` stands for "no caller": the request is absent, the header is missing,
/// or its value is not a decimal `i64`. A caller legitimately numbered `0`
/// cannot be told apart from these cases.
pub fn caller_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |req| parse_id(req.headers(), CALLER_ID_HEADER))
}

/// Client identifier stamped on the request, or `0`. Same contract as
/// [`caller_id`].
pub fn client_id<B>(request: Option<&Request<B>>) -> i64 {
    request.map_or(0, |req| parse_id(req.headers(), CLIENT_ID_HEADER))
}

fn public_marker(headers: &HeaderMap) -> bool {
    headers
        .get(PUBLIC_HEADER)
        .is_some_and(|value| value.as_bytes() == b"true")
}

fn parse_id(headers: &HeaderMap, name: &str) -> i64 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .unwrap_or(0)
}

/// Snapshot of the identity markers on a request.
///
/// Usable as a handler argument; it never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Identity {
    pub public: bool,
    pub caller_id: i64,
    pub client_id: i64,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            public: public_marker(headers),
            caller_id: parse_id(headers, CALLER_ID_HEADER),
            client_id: parse_id(headers, CLIENT_ID_HEADER),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.caller_id != 0 && self.client_id != 0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
