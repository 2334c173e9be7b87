//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::json::HealthResponse;
use crate::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler. Degraded when the store cannot be read.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = state.run(|engine| engine.store().counts()).await.is_ok();

    Json(HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.engine.resolver().stats(),
    })
}
