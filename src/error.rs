//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Services return this enum directly; only [`IntoResponse`] knows about HTTP.
///
/// # Error Categories
///
/// - **Validation Errors**: malformed dates, times, seat lists; rejected before storage
/// - **Conflict Errors**: seats already booked, duplicate or in-use resources
/// - **Authentication / Authorization Errors**: bad tokens, bad credentials, wrong role
/// - **Resource Errors**: requested resources not found
/// - **Storage Errors**: any `sqlx::Error` not mapped to one of the above
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Returns HTTP 500; details are logged, never sent to the client.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("{0}")]
    InvalidRequest(String),

    /// One or more requested seats already belong to another booking of the same show.
    ///
    /// Returns HTTP 409 Conflict with the conflicting labels in `results`.
    #[error("Seats are already taken")]
    SeatsUnavailable(Vec<String>),

    /// Authorization header is missing, malformed, or the token is invalid/expired.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Email/password pair did not match a user.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated user lacks the role required by the endpoint.
    #[error("Only admin can access")]
    Forbidden,

    #[error("Movie not found")]
    MovieNotFound,

    #[error("Payment method not found")]
    PaymentMethodNotFound,

    #[error("User not found")]
    UserNotFound,

    /// Genre, actor or director lookup by id failed.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Email address is already registered.
    #[error("Email already registered")]
    EmailTaken,

    /// Operation clashes with existing data (duplicate name, referenced row, ...).
    #[error("{0}")]
    Conflict(String),

    /// Unreachable state or failure in a non-database dependency.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::SeatsUnavailable(_) => (StatusCode::CONFLICT, "seats_unavailable"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::MovieNotFound => (StatusCode::NOT_FOUND, "movie_not_found"),
            AppError::PaymentMethodNotFound => {
                (StatusCode::NOT_FOUND, "payment_method_not_found")
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::EmailTaken => (StatusCode::CONFLICT, "email_taken"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "success": false,
///   "message": "Seats are already taken",
///   "errors": "seats_unavailable",
///   "results": ["A1"]
/// }
/// ```
///
/// `results` is only present for seat conflicts.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = match self {
            AppError::SeatsUnavailable(seats) => json!({
                "success": false,
                "message": message,
                "errors": code,
                "results": seats,
            }),
            _ => json!({
                "success": false,
                "message": message,
                "errors": code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn seat_conflict_lists_conflicting_seats() {
        let response = AppError::SeatsUnavailable(vec!["B5".to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"], "seats_unavailable");
        assert_eq!(body["results"], json!(["B5"]));
    }

    #[tokio::test]
    async fn validation_error_is_bad_request_with_message() {
        let response =
            AppError::InvalidRequest("Invalid show_time format".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid show_time format");
        assert!(body.get("results").is_none());
    }

    #[tokio::test]
    async fn database_error_details_are_hidden() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
        assert_eq!(body["errors"], "internal_error");
    }

    #[tokio::test]
    async fn missing_catalog_entry_names_its_kind() {
        let response = AppError::NotFound("Genre").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Genre not found");
        assert_eq!(body["errors"], "not_found");
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            AppError::InvalidToken.status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.status_and_code().0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status_and_code().0, StatusCode::FORBIDDEN);
    }
}
