//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors to HTTP status codes and the JSON `errors` envelope.
//! Internal error detail is logged server-side and never returned to
//! clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadastro_core::password::HashError;
use cadastro_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Error response envelope: one entry per problem.
///
/// Validation failures carry one entry per violated rule so a client can
/// surface every problem in a single round trip.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorsBody {
    pub errors: Vec<String>,
}

/// Success envelope for operations that return no resource body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Entity construction failed (400). One envelope entry per rule.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed body or missing required field (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Referenced customer or address does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing, malformed, expired, or forged bearer token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Storage failure (500). Detail is logged, not returned.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unexpected failure (500). Detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HashError> for AppError {
    fn from(e: HashError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let errors = match self {
            Self::Validation(e) => e.into_violations(),
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Unauthorized(msg) => vec![msg],
            Self::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                vec!["Internal Server Error".to_string()]
            }
            Self::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal server error");
                vec!["Internal Server Error".to_string()]
            }
        };

        (status, Json(ErrorsBody { errors })).into_response()
    }
}

/// Result type alias for handlers and services.
pub type AppResult<T> = Result<T, AppError>;
