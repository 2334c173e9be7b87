//! Language listing.

use axum::{extract::State, routing::get, Json, Router};
use transdb_core::Language;

use crate::error::AppError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/languages", get(list_languages))
}

async fn list_languages(State(state): State<AppState>) -> Result<Json<Vec<Language>>, AppError> {
    let languages = state.run(|engine| engine.languages()).await?;
    Ok(Json(languages))
}
