use std::sync::Arc;

use axum::{
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use fact_pipeline::{Analysis, FactRecord, GapRecord};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::review::review_request::{
        AddFactRequest, UpdateAnalysisRequest, UpdateFactRequest, UpdateGapRequest,
    },
};

/// `PATCH /api/analyses/{id}`: status and/or category.
#[instrument(name = "update_analysis_route", skip_all)]
pub async fn update_analysis_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateAnalysisRequest>, JsonRejection>,
) -> AppResult<Json<Analysis>> {
    let Path(id) = id?;
    let Json(body) = payload?;
    Ok(Json(state.store.update_analysis(id, body.into()).await?))
}

/// `POST /api/analyses/{id}/facts`: adds a manual fact.
#[instrument(name = "add_fact_route", skip_all)]
pub async fn add_fact_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<AddFactRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<FactRecord>)> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let fact = state.store.add_fact(id, &body.text).await?;
    info!(analysis_id = id, fact_id = fact.id, "fact added");
    Ok((StatusCode::CREATED, Json(fact)))
}

/// `PATCH /api/facts/{id}`
#[instrument(name = "update_fact_route", skip_all)]
pub async fn update_fact_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFactRequest>, JsonRejection>,
) -> AppResult<Json<FactRecord>> {
    let Path(id) = id?;
    let Json(body) = payload?;
    Ok(Json(state.store.update_fact(id, body.into()).await?))
}

/// `DELETE /api/facts/{id}`
#[instrument(name = "delete_fact_route", skip_all)]
pub async fn delete_fact_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.store.delete_fact(id).await?;
    info!(fact_id = id, "fact deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/gaps/{id}`
#[instrument(name = "update_gap_route", skip_all)]
pub async fn update_gap_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateGapRequest>, JsonRejection>,
) -> AppResult<Json<GapRecord>> {
    let Path(id) = id?;
    let Json(body) = payload?;
    Ok(Json(state.store.update_gap(id, body.into()).await?))
}
