use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /health - liveness plus a store ping; not behind the credential gate
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "database unavailable"
                })),
            )
        }
    }
}
