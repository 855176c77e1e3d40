// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;

/// Body returned for any store fault. The cause is logged, never sent.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error";

/// Body returned by the credential gate
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid API Key";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request: missing or unparseable query parameters
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found: update/delete matched no row
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// 400 naming every missing required field, in declaration order
    pub fn missing_fields(fields: &[&str]) -> Self {
        let noun = if fields.len() == 1 { "field" } else { "fields" };
        ApiError::BadRequest(format!("Missing required {}: {}", noun, fields.join(", ")))
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        // Log the real error but return generic message
        match &err {
            DatabaseError::Timeout(after) => tracing::error!("Store call timed out after {:?}", after),
            DatabaseError::RowFormat(row) => tracing::error!("Unexpected row format from store: {}", row),
            DatabaseError::Sqlx(sqlx_err) => tracing::error!("SQLx error: {}", sqlx_err),
        }
        ApiError::internal_server_error()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn renders_single_error_field() {
        let err = ApiError::not_found("Record not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json(), json!({ "error": "Record not found" }));
    }

    #[test]
    fn missing_fields_names_each_field() {
        assert_eq!(ApiError::missing_fields(&["id"]).message(), "Missing required field: id");
        assert_eq!(
            ApiError::missing_fields(&["name", "email"]).message(),
            "Missing required fields: name, email"
        );
    }

    #[test]
    fn store_errors_are_generic() {
        let err: ApiError = DatabaseError::Timeout(Duration::from_millis(5)).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_json(), json!({ "error": "Internal Server Error" }));

        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn unauthorized_body() {
        let err = ApiError::unauthorized();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_json(), json!({ "error": "Unauthorized: Invalid API Key" }));
    }
}
