use std::sync::Arc;

use axum::extract::{Json, State, rejection::JsonRejection};
use fact_pipeline::RuntimeSettings;
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::settings::settings_request::{ProviderOption, SettingsResponse, UpdateSettingsRequest},
};

/// `GET /api/settings`: saved settings, or the startup config when none were saved.
pub async fn get_settings_route(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    if let Some(saved) = state.store.settings().await {
        return Json(saved_response(saved));
    }

    let cfg = state.llm.config().await;
    Json(SettingsResponse {
        provider: cfg.provider.as_key().to_string(),
        model: cfg.model,
        updated_at: None,
        providers: ProviderOption::all(),
    })
}

/// `PUT /api/settings`: applies a provider/model pair and stores it once the
/// new client is in place.
#[instrument(name = "update_settings_route", skip_all)]
pub async fn update_settings_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateSettingsRequest>, JsonRejection>,
) -> AppResult<Json<SettingsResponse>> {
    let Json(body) = payload?;

    let pending = RuntimeSettings::new(&body.provider, &body.model)?;
    let rebuilt = state
        .llm
        .apply_settings(&pending.provider, &pending.model)
        .await?;
    let saved = state.store.save_settings(pending).await;
    info!(provider = %saved.provider, model = %saved.model, rebuilt, "settings applied");

    Ok(Json(saved_response(saved)))
}

fn saved_response(saved: RuntimeSettings) -> SettingsResponse {
    SettingsResponse {
        provider: saved.provider,
        model: saved.model,
        updated_at: Some(saved.updated_at),
        providers: ProviderOption::all(),
    }
}
