use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::config::ApiKey;
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Credential gate applied to every `/api/*` route.
///
/// Rejects with 401 before any handler (and therefore any store call) runs.
/// Only the outcome is logged; neither the presented value nor the configured
/// secret ever reaches the log.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request.headers().get(API_KEY_HEADER);

    if !verify_api_key(presented, &state.config.security.api_key) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            header_present = presented.is_some(),
            "API key rejected"
        );
        return Err(ApiError::unauthorized());
    }

    tracing::debug!(method = %request.method(), path = %request.uri().path(), "API key accepted");
    Ok(next.run(request).await)
}

/// Byte-for-byte, constant-time comparison of the presented header against the secret.
/// An absent or empty header never matches.
pub fn verify_api_key(presented: Option<&HeaderValue>, expected: &ApiKey) -> bool {
    match presented {
        Some(value) if !value.is_empty() && !expected.is_empty() => {
            value.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_passes() {
        let key = ApiKey::new("s3cret");
        assert!(verify_api_key(Some(&HeaderValue::from_static("s3cret")), &key));
    }

    #[test]
    fn absent_or_empty_key_fails() {
        let key = ApiKey::new("s3cret");
        assert!(!verify_api_key(None, &key));
        assert!(!verify_api_key(Some(&HeaderValue::from_static("")), &key));
    }

    #[test]
    fn mismatch_fails() {
        let key = ApiKey::new("s3cret");
        assert!(!verify_api_key(Some(&HeaderValue::from_static("s3cre")), &key));
        assert!(!verify_api_key(Some(&HeaderValue::from_static("s3cret ")), &key));
        assert!(!verify_api_key(Some(&HeaderValue::from_static("S3CRET")), &key));
    }

    #[test]
    fn non_utf8_header_is_compared_as_bytes() {
        let key = ApiKey::new("s3cret");
        let value = HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap();
        assert!(!verify_api_key(Some(&value), &key));
    }
}
