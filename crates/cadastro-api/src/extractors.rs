//! # Request Validation Helpers
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and run it through
//! [`extract_validated_json`], so malformed JSON and shape-level rule
//! violations both surface as 400 responses instead of axum's default
//! rejection bodies. Deep per-field rules live in the entity constructors,
//! not here.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Shape-level request validation: required fields present, ids plausible.
pub trait Validate {
    /// # Errors
    ///
    /// A human-readable description of the first violated requirement.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body extraction and validate the payload.
///
/// # Errors
///
/// `AppError::BadRequest` when the body is not valid JSON for `T` or when
/// the payload fails its [`Validate`] check.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(payload) =
        body.map_err(|rejection| AppError::BadRequest(format!("Invalid JSON input: {rejection}")))?;
    payload.validate().map_err(AppError::BadRequest)?;
    Ok(payload)
}
