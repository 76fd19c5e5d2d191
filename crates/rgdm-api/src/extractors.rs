//! # Request Extraction & Validation
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through
//! [`extract_json`] or [`extract_validated_json`], so malformed bodies come
//! back in the standard error shape instead of axum's plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Business rules checked after deserialization.
pub trait Validate {
    /// Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
