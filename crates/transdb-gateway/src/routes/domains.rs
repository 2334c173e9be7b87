//! Domain endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::AppError;
use crate::json::{DomainListResponse, DomainResponse, ExportResponse};
use crate::AppState;

/// Domain routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/domains", get(list_domains))
        .route("/domains/:name", get(get_domain))
        .route("/domains/:name/export", post(export_domain))
}

async fn list_domains(State(state): State<AppState>) -> Result<Json<DomainListResponse>, AppError> {
    let domains = state.run(|engine| engine.domain_names()).await?;
    Ok(Json(DomainListResponse { domains }))
}

/// Every string of the domain with its translations.
async fn get_domain(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DomainResponse>, AppError> {
    let tree = state.run(move |engine| engine.domain_tree(&name)).await?;
    Ok(Json(tree.into()))
}

/// Export the domain now, bypassing the queue.
async fn export_domain(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ExportResponse>, AppError> {
    let dir = state.config.export_dir.clone();
    let files = state
        .run(move |engine| engine.export_domain(&name, &dir))
        .await?;
    Ok(Json(files.into()))
}
