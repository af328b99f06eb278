/*
 * Responsibility
 * - GET /health (疎通用)
 * - DB への status check を含む (落ちていたら 503)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::repos;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match repos::status_check(&state.db).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(err) => {
            tracing::warn!(error = %err, "database status check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "database not ready"})),
            )
        }
    }
}
