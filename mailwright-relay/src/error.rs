//! Relay error type and its HTTP mapping
//!
//! Every error becomes a JSON body of the form `{ "detail": "..." }`, which
//! is what `mailwright`'s HTTP client reads to build the message shown to
//! the user.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors returned by relay handlers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Request body failed validation (422)
    #[error("{0}")]
    Unprocessable(String),

    /// Request is well-formed but cannot be served (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upstream rejected the supplied credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Upstream could not be reached (502)
    #[error("{0}")]
    BadGateway(String),

    /// Anything else (500)
    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create an internal error from a string message
    #[must_use]
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
