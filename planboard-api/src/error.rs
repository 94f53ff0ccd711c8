/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>` which converts into a JSON body of the shape
/// `{"error": "<message>"}` with the matching status code. Messages are
/// for humans; there are no machine-readable error codes, and callers
/// cannot distinguish failure causes beyond the HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform message for both unknown-email and wrong-password login
/// failures, so the two cases are indistinguishable to callers.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing payload fields (400)
    BadRequest(String),

    /// Missing, invalid, or expired token (401)
    Unauthenticated(String),

    /// Login failure, uniform for unknown email and wrong password (401)
    InvalidCredentials,

    /// Unknown id (404)
    NotFound(String),

    /// Store or I/O failure (500); detail is logged, not exposed
    InternalError(String),
}

/// Error response format: `{"error": "<message>"}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::InvalidCredentials => write!(f, "{}", INVALID_CREDENTIALS_MESSAGE),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalError(msg) => {
                // Log detail but keep the response generic
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse { error: message });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Every data-access failure becomes a generic `InternalError` at the
/// handler boundary, except a missing row which maps to `NotFound`.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<planboard_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: planboard_shared::auth::jwt::JwtError) -> Self {
        match err {
            planboard_shared::auth::jwt::JwtError::Expired => {
                ApiError::Unauthenticated("token expired".to_string())
            }
            planboard_shared::auth::jwt::JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthenticated("invalid token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<planboard_shared::auth::password::PasswordError> for ApiError {
    fn from(err: planboard_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Flattens validator errors into a single `BadRequest` message
pub fn validation_error(errors: &validator::ValidationErrors) -> ApiError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for {}", field))
            })
        })
        .collect();
    messages.sort();

    ApiError::BadRequest(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("invalid payload".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid payload");

        let err = ApiError::NotFound("project not found".to_string());
        assert_eq!(err.to_string(), "Not found: project not found");
    }

    #[test]
    fn test_invalid_credentials_is_uniform() {
        // Both login failure paths produce this exact variant; the message
        // must not leak whether the email existed.
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            INVALID_CREDENTIALS_MESSAGE
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
