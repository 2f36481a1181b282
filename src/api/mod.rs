//! REST API module.
//!
//! Contains all API routes and handlers.

mod members;

pub use members::*;

use axum::{body::Bytes, Json};
use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Response type for JSON handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// GET / - Liveness check.
pub async fn home() -> &'static str {
    "Family Points API is running! 🎉"
}

/// Decode a mutating request body.
///
/// Anything but a JSON object (empty, `null`, arrays, scalars) is a bad request;
/// an object with values of the wrong type is a validation error.
pub fn parse_payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(not_an_object());
    }

    // Derived struct impls also accept positional arrays, so check the shape first
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(not_an_object());
    }

    Ok(serde_json::from_value(value)?)
}

fn not_an_object() -> AppError {
    AppError::BadRequest("Request body must be a JSON object".to_string())
}
