//! JSON response envelope shared by every endpoint.
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Transaction created successfully",
//!   "results": { ... }
//! }
//! ```
//!
//! Failures use the same shape with `success: false` and an `errors` code,
//! see [`crate::error::AppError`].

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying a payload.
    pub fn ok(message: impl Into<String>, results: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            results: Some(results),
            errors: None,
        }
    }
}

impl ApiResponse<()> {
    /// Successful response with no payload (e.g. deletes).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            results: None,
            errors: None,
        }
    }
}
