use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// Successful API response: the serialized body plus its status code
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.data) {
            Ok(value) => (self.status_code, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error().into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
