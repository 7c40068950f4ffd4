use std::sync::Arc;

use axum::extract::{
    Json, Path, Query, State,
    rejection::{PathRejection, QueryRejection},
};
use fact_pipeline::{Analysis, AnalysisSummary, Dashboard, HeadlineOptions};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{core::app_state::AppState, error_handler::AppResult};

/// Rows of `GET /api/analyses` when no `limit` is given.
const LIST_LIMIT: usize = 100;
/// Recent rows on the dashboard when no `limit` is given.
const DASHBOARD_LIMIT: usize = 5;

/// `?limit=N`; unparsable values fall back to the route default.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn limit_or(&self, default: usize) -> usize {
        self.limit
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisList {
    pub items: Vec<AnalysisSummary>,
}

/// `GET /api/analyses`
#[instrument(name = "list_analyses_route", skip_all)]
pub async fn list_analyses_route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Json<AnalysisList>> {
    let Query(query) = query?;
    let items = state.store.list(query.limit_or(LIST_LIMIT)).await;
    Ok(Json(AnalysisList { items }))
}

/// `GET /api/dashboard`
pub async fn dashboard_route(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LimitQuery>, QueryRejection>,
) -> AppResult<Json<Dashboard>> {
    let Query(query) = query?;
    Ok(Json(state.store.dashboard(query.limit_or(DASHBOARD_LIMIT)).await))
}

/// `GET /api/analyses/{id}`
#[instrument(name = "get_analysis_route", skip_all)]
pub async fn get_analysis_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Analysis>> {
    let Path(id) = id?;
    Ok(Json(state.store.get(id).await?))
}

/// `POST /api/analyses/{id}/headlines`: regenerates headline options.
#[instrument(name = "headlines_route", skip_all)]
pub async fn headlines_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<HeadlineOptions>> {
    let Path(id) = id?;
    Ok(Json(state.phase_one.generate_headline_options(id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_falls_back_on_garbage() {
        let q = |v: Option<&str>| LimitQuery {
            limit: v.map(str::to_string),
        };
        assert_eq!(q(None).limit_or(5), 5);
        assert_eq!(q(Some("abc")).limit_or(5), 5);
        assert_eq!(q(Some(" 20 ")).limit_or(5), 20);
    }
}
