//! Error taxonomy shared by every route.
//!
//! Services raise an [`AppError`] where the condition is detected and the
//! handler hands it straight back to axum, which renders it through
//! [`IntoResponse`] as a status code plus a `{"message": ...}` body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. One message for both.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Authorization value missing, without the `Bearer ` prefix, or not a token at all.
    #[error("Invalid request: {0}")]
    MalformedToken(String),

    /// Token decoded but failed signature, issuer or expiry checks.
    #[error("Unauthorized: invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken(_) => StatusCode::FORBIDDEN,
            Self::MalformedToken(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Referenced id has no record. 404.
    #[error("{0}")]
    NotFound(String),

    /// Request values that could not be coerced. 400.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Persistence or I/O failure. Logged, answered with a generic 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(err) => err.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Internal(err) => {
                error!(error = ?err, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
