use std::{env, sync::Arc};

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tokio::signal;
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::cors::cors,
    routes::{
        analyse::analyse_route::analyse_route,
        analyses_route::{
            dashboard_route, get_analysis_route, headlines_route, list_analyses_route,
        },
        categories_route::categories_route,
        health_route::{health_route, llm_health_route},
        review::review_route::{
            add_fact_route, delete_fact_route, update_analysis_route, update_fact_route,
            update_gap_route,
        },
        settings::settings_route::{get_settings_route, update_settings_route},
    },
};

/// Listen address when `API_ADDRESS` is not set.
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8085";

/// All HTTP routes over shared state, wrapped in the CORS middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_route))
        .route("/health/llm", get(llm_health_route))
        .route("/api/analyse", post(analyse_route))
        .route("/api/dashboard", get(dashboard_route))
        .route("/api/analyses", get(list_analyses_route))
        .route(
            "/api/analyses/{id}",
            get(get_analysis_route).patch(update_analysis_route),
        )
        .route("/api/analyses/{id}/headlines", post(headlines_route))
        .route("/api/analyses/{id}/facts", post(add_fact_route))
        .route(
            "/api/facts/{id}",
            patch(update_fact_route).delete(delete_fact_route),
        )
        .route("/api/gaps/{id}", patch(update_gap_route))
        .route("/api/categories", get(categories_route))
        .route(
            "/api/settings",
            get(get_settings_route).put(update_settings_route),
        )
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Builds state from the environment and serves until Ctrl+C.
pub async fn start() -> AppResult<()> {
    let host_url = env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_ADDRESS.to_string());

    let state = Arc::new(AppState::from_env()?);
    let cfg = state.llm.config().await;
    info!(
        provider = cfg.provider.as_key(),
        model = %cfg.model,
        endpoint = %cfg.endpoint,
        has_api_key = cfg.has_api_key(),
        "llm provider configured"
    );

    let app = router(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
