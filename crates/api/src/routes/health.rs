use axum::{extract::State, routing::get, Json, Router};
use lobianco_core::StoreHealth;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check. A server started without a database reports
/// `degraded`; an unreachable database is a 503.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let subscribers = state.service().events().subscriber_count();
    match state.service().store_health().await {
        StoreHealth::Connected => Ok(Json(json!({
            "status": "ok",
            "database": "connected",
            "subscribers": subscribers,
        }))),
        StoreHealth::NotConfigured => Ok(Json(json!({
            "status": "degraded",
            "database": "notConfigured",
            "subscribers": subscribers,
        }))),
        StoreHealth::Unreachable(e) => Err(ApiError::Unavailable(format!(
            "database health check failed: {e}"
        ))),
    }
}

/// Lightweight ping, no database check.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
