//! Translation write endpoints.
//!
//! `PUT` overwrites an existing translation only. `POST` creates the string
//! and translation when missing and overwrites otherwise. Both queue the
//! domain for re-export once the write has been stored. A write that was
//! stored is reported as successful even if the queue has already stopped.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::put,
    Json, Router,
};

use crate::error::AppError;
use crate::json::{TranslationBody, WriteResponse};
use crate::AppState;

type TranslationPath = Path<(String, String, String)>;

/// Translation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/domains/:domain/strings/:string/translations/:lang",
        put(update_translation).post(create_translation),
    )
}

async fn update_translation(
    State(state): State<AppState>,
    Path((domain, string, lang)): TranslationPath,
    body: Bytes,
) -> Result<Json<WriteResponse>, AppError> {
    let TranslationBody { content } = serde_json::from_slice(&body)?;
    let name = domain.clone();
    let upserted = state
        .run(move |engine| engine.update_translation(&name, &string, &lang, &content))
        .await?;
    queue_export(&state, domain).await;
    Ok(Json(upserted.into()))
}

async fn create_translation(
    State(state): State<AppState>,
    Path((domain, string, lang)): TranslationPath,
    body: Bytes,
) -> Result<Json<WriteResponse>, AppError> {
    let TranslationBody { content } = serde_json::from_slice(&body)?;
    let name = domain.clone();
    let upserted = state
        .run(move |engine| engine.create_or_update_translation(&name, &string, &lang, &content))
        .await?;
    queue_export(&state, domain).await;
    Ok(Json(upserted.into()))
}

async fn queue_export(state: &AppState, domain: String) {
    if let Err(e) = state.queue.enqueue(domain.clone()).await {
        tracing::warn!(domain = %domain, error = %e, "re-export not queued");
    }
}
