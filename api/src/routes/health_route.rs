use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::core::app_state::AppState;

/// `GET /health`: liveness only, never touches the LLM.
pub async fn health_route() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /health/llm`: checks the active provider; 503 when it is unusable.
pub async fn llm_health_route(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthStatus>) {
    let status = state.llm.health().await;
    let code = if status.ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
