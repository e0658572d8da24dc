use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::OAuthConfig;
use crate::error::RestError;

pub const INVALID_RESPONSE_MESSAGE: &str =
    "invalid rest client response when trying to get access token";
pub const INVALID_ERROR_BODY_MESSAGE: &str =
    "invalid error interface when trying to get access token";
pub const INVALID_TOKEN_BODY_MESSAGE: &str =
    "error when trying to unmarshal access token response";

/// Identity resolved from an access token.
///
/// A zero `user_id` or `client_id` never denotes an authenticated party.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedToken {
    pub id: String,
    pub user_id: i64,
    pub client_id: i64,
}

/// Maps an access-token identifier to the identity it was issued for.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    async fn resolve(&self, token_id: &str) -> Result<ResolvedToken, RestError>;
}

#[derive(Debug, Error)]
pub enum ResolverInitError {
    #[error("invalid token service base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Resolves tokens with `GET {base_url}/oauth/access_token/{token_id}`.
#[derive(Debug, Clone)]
pub struct HttpTokenResolver {
    base_url: Url,
    client: Client,
}

impl HttpTokenResolver {
    pub fn new(config: &OAuthConfig) -> Result<Self, ResolverInitError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| {
            ResolverInitError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: err.to_string(),
            }
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ResolverInitError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "expected an http(s) url".to_string(),
            });
        }

        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { base_url, client })
    }

    /// Lookup URL for `token_id`; the identifier is encoded as one segment.
    ///
    /// `None` for identifiers made only of dots (or empty): URL parsing
    /// collapses `.` and `..` segments, so they cannot address a token.
    pub fn token_url(&self, token_id: &str) -> Option<Url> {
        if token_id.chars().all(|c| c == '.') {
            return None;
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["oauth", "access_token", token_id]);
        Some(url)
    }
}

#[async_trait]
impl TokenResolver for HttpTokenResolver {
    async fn resolve(&self, token_id: &str) -> Result<ResolvedToken, RestError> {
        let Some(url) = self.token_url(token_id) else {
            tracing::debug!(token_id, "token id is not addressable, skipping lookup");
            return Err(RestError::not_found("no access token found with given id"));
        };
        let response = self.client.get(url).send().await.map_err(|err| {
            tracing::debug!(
                error = %err,
                timeout = err.is_timeout(),
                "token service unreachable"
            );
            RestError::internal_server_error(INVALID_RESPONSE_MESSAGE, Some(&err))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|err| {
            RestError::internal_server_error(INVALID_RESPONSE_MESSAGE, Some(&err))
        })?;

        if status > 299 {
            let remote = RestError::from_response_body(&body, status).map_err(|err| {
                RestError::internal_server_error(INVALID_ERROR_BODY_MESSAGE, Some(&err))
            })?;
            return Err(remote);
        }

        serde_json::from_slice::<ResolvedToken>(&body).map_err(|err| {
            RestError::internal_server_error(INVALID_TOKEN_BODY_MESSAGE, Some(&err))
        })
    }
}
