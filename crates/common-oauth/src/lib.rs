//! Access-token authentication for HTTP requests.
//!
//! An [`Authenticator`] reads the `access_token` query parameter, resolves it
//! against the token service through a [`TokenResolver`], and stamps the
//! resolved caller and client identifiers on the request as `X-Caller-Id`
//! and `X-Client-Id`. The functions in [`identity`] read those markers back.

pub mod authenticate;
pub mod client;
pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;

pub use authenticate::Authenticator;
pub use client::{HttpTokenResolver, ResolvedToken, ResolverInitError, TokenResolver};
pub use config::OAuthConfig;
pub use error::RestError;
pub use identity::{caller_id, client_id, is_public, Identity};
