//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps store, payload, and verification errors to HTTP status codes with a
//! JSON body of error code and message. Internal details are logged, never
//! returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "NOT_VERIFIED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request payload failed validation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid session or login token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The presentation's signature recovers to a key other than the trusted one (403).
    #[error("presented data is not signed by the trusted issuer")]
    NotVerified,

    /// Verification could not complete (403).
    #[error("failed to verify authenticity of presented data")]
    VerificationFailed,

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::NotVerified => (StatusCode::FORBIDDEN, "NOT_VERIFIED"),
            Self::VerificationFailed => (StatusCode::FORBIDDEN, "VERIFICATION_FAILED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<rgdm_core::ValidationError> for AppError {
    fn from(err: rgdm_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<rgdm_verifier::VerificationError> for AppError {
    fn from(_: rgdm_verifier::VerificationError) -> Self {
        Self::VerificationFailed
    }
}
