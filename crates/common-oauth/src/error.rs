use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured failure exchanged with the token service and returned to
/// callers of the authenticator.
///
/// The wire form is `{"message", "status", "error", "causes"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct RestError {
    pub message: String,
    pub status: u16,
    pub error: String,
    pub causes: Vec<String>,
}

impl RestError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
            error: error_slug(status.as_u16()),
            causes: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal_server_error(
        message: impl Into<String>,
        cause: Option<&dyn std::error::Error>,
    ) -> Self {
        let mut error = Self::new(StatusCode::INTERNAL_SERVER_ERROR, message);
        if let Some(cause) = cause {
            error.causes.push(cause.to_string());
        }
        error
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    /// HTTP status for this error; classifications outside the HTTP range
    /// map to 500.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Decode an error body sent by the token service.
    ///
    /// `message` is mandatory. A missing `status` inherits `http_status`, the
    /// status line of the response that carried the body.
    pub fn from_response_body(bytes: &[u8], http_status: u16) -> Result<Self, serde_json::Error> {
        let raw: RawRestError = serde_json::from_slice(bytes)?;
        let status = raw.status.unwrap_or(http_status);
        Ok(Self {
            message: raw.message,
            status,
            error: raw.error.unwrap_or_else(|| error_slug(status)),
            causes: raw
                .causes
                .into_iter()
                .map(|cause| match cause {
                    Value::String(text) => text,
                    other => other.to_string(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawRestError {
    message: String,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    causes: Vec<Value>,
}

/// `404` becomes `not_found`, `500` becomes `internal_server_error`.
fn error_slug(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(|reason| reason.to_ascii_lowercase().replace([' ', '-'], "_"))
        .unwrap_or_else(|| "unknown_error".to_string())
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = Json(self).into_response();
        *response.status_mut() = status;
        response
    }
}
