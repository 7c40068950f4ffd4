use std::sync::Arc;

use axum::extract::{Json, State, rejection::JsonRejection};
use fact_pipeline::PhaseOneResponse;
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::analyse::analyse_request::AnalyseRequest,
};

/// `POST /api/analyse`: runs phase one and returns the saved analysis.
#[instrument(name = "analyse_route", skip_all)]
pub async fn analyse_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyseRequest>, JsonRejection>,
) -> AppResult<Json<PhaseOneResponse>> {
    let Json(body) = payload?;
    info!(
        has_text = !body.text.trim().is_empty() || !body.content.trim().is_empty(),
        has_url = !body.url.trim().is_empty(),
        language = %body.language,
        with_headlines = body.with_headlines,
        "analyse requested"
    );

    let out = state.phase_one.run(body.into()).await?;
    Ok(Json(out))
}
