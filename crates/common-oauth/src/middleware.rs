use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::Router;

use crate::authenticate::Authenticator;
use crate::error::RestError;

/// Authenticate every request reaching `router`.
///
/// ```ignore
/// let authenticator = Arc::new(Authenticator::from_config(&config.oauth)?);
/// let v1 = common_oauth::middleware::apply(v1, authenticator);
/// ```
pub fn apply<S>(router: Router<S>, authenticator: Arc<Authenticator>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(authenticator, authenticate_request))
}

/// Stamps trusted identity headers on the request or rejects it with the
/// lookup failure.
pub async fn authenticate_request(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, RestError> {
    authenticator.authenticate(Some(&mut req)).await?;
    Ok(next.run(req).await)
}
