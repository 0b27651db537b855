use axum::{
    extract::rejection::PathRejection,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use error_ext::{BoxError, StdErrorExt};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[serde(rename = "Error")]
    pub error: String,
}

/// Errors returned by handlers; [IntoResponse] is the single place mapping them to responses.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("account with ID {0} not found")]
    NotFound(i64),

    #[error("no route for {0}")]
    NoRoute(String),

    #[error("method not allowed {0}")]
    MethodNotAllowed(Method),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("request timed out")]
    Timeout,

    /// The source is only logged, never exposed to clients.
    #[error("cannot access account storage")]
    Storage(#[source] BoxError),

    #[error("internal server error")]
    Internal(#[source] BoxError),
}

impl Error {
    pub fn storage<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Storage(Box::new(error))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) | Error::NoRoute(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::Timeout => StatusCode::REQUEST_TIMEOUT,
            Error::Storage(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Request bodies are decoded regardless of their content type.
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Validation(format!("invalid request body: {error}"))
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(error = self.as_chain(), %status_code, "cannot handle request");
        } else {
            debug!(error = %self, %status_code, "rejected request");
        }

        let body = ApiError {
            error: self.to_string(),
        };
        (status_code, Json(body)).into_response()
    }
}
