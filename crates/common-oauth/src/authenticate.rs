use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, Request, Uri};
use url::form_urlencoded;

use crate::client::{HttpTokenResolver, ResolvedToken, ResolverInitError, TokenResolver};
use crate::config::OAuthConfig;
use crate::error::RestError;
use crate::identity::{ACCESS_TOKEN_PARAM, CALLER_ID_HEADER, CLIENT_ID_HEADER};

/// Turns the `access_token` query parameter of a request into trusted
/// caller/client identity headers.
#[derive(Clone)]
pub struct Authenticator {
    resolver: Arc<dyn TokenResolver>,
}

impl Authenticator {
    pub fn new(resolver: Arc<dyn TokenResolver>) -> Self {
        Self { resolver }
    }

    /// Authenticator backed by the HTTP token service described by `config`.
    pub fn from_config(config: &OAuthConfig) -> Result<Self, ResolverInitError> {
        Ok(Self::new(Arc::new(HttpTokenResolver::new(config)?)))
    }

    /// Authenticate `request` in place.
    ///
    /// Any caller/client headers the request arrived with are removed first,
    /// whatever the outcome. They are re-populated only from a successful
    /// lookup. An absent request, a missing or blank token and a token the
    /// service does not know all succeed anonymously; every other lookup
    /// failure is returned unchanged.
    pub async fn authenticate<B>(&self, request: Option<&mut Request<B>>) -> Result<(), RestError> {
        let Some(request) = request else {
            return Ok(());
        };

        strip_identity(request.headers_mut());

        let Some(token_id) = access_token(request.uri()) else {
            tracing::debug!("no access token on request, continuing anonymously");
            return Ok(());
        };

        match self.resolver.resolve(&token_id).await {
            Ok(token) => {
                tracing::debug!(
                    caller_id = token.user_id,
                    client_id = token.client_id,
                    "access token resolved"
                );
                stamp_identity(request.headers_mut(), &token);
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!("access token unknown, continuing anonymously");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    status = err.status,
                    error = %err.error,
                    message = %err.message,
                    "access token lookup failed"
                );
                Err(err)
            }
        }
    }
}

fn strip_identity(headers: &mut HeaderMap) {
    headers.remove(CALLER_ID_HEADER);
    headers.remove(CLIENT_ID_HEADER);
}

fn stamp_identity(headers: &mut HeaderMap, token: &ResolvedToken) {
    headers.insert(CALLER_ID_HEADER, HeaderValue::from(token.user_id));
    headers.insert(CLIENT_ID_HEADER, HeaderValue::from(token.client_id));
}

/// First `access_token` query value, trimmed; `None` when blank.
fn access_token(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ACCESS_TOKEN_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
