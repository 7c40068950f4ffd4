use std::sync::Arc;

use axum::extract::{Json, State};
use fact_pipeline::Topic;

use crate::core::app_state::AppState;

/// `GET /api/categories`
pub async fn categories_route(State(state): State<Arc<AppState>>) -> Json<Vec<Topic>> {
    Json(state.store.categories().await)
}
