//! transdb HTTP/JSON gateway.
//!
//! Exposes the translation store over REST. Every successful translation
//! write queues its domain for re-export to the configured export directory.

pub mod config;
pub mod error;
pub mod export_queue;
pub mod json;
pub mod routes;

pub use config::{Args, ConfigError, GatewayConfig};
pub use error::AppError;
pub use export_queue::{ExportQueue, ExportStats, ExportWorker, QueueClosed};

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use transdb_core::Engine;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Synchronization engine.
    pub engine: Arc<Engine>,
    /// Producer side of the export queue.
    pub queue: ExportQueue,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: Arc<Engine>, queue: ExportQueue, config: GatewayConfig) -> Self {
        Self {
            engine,
            queue,
            config,
        }
    }

    /// Run a store operation on the blocking pool.
    pub async fn run<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&Engine) -> transdb_core::Result<T> + Send + 'static,
    {
        let engine = self.engine.clone();
        let result = tokio::task::spawn_blocking(move || f(&engine)).await?;
        Ok(result?)
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::languages::routes())
        .merge(routes::domains::routes())
        .merge(routes::translations::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
