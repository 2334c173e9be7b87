//! transdb HTTP/JSON gateway binary.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transdb_core::Engine;
use transdb_gateway::{create_router, AppState, Args, ExportWorker, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("transdb_gateway={level},transdb_core={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load(&args)?;
    info!(
        listen = %config.listen_addr,
        database = %config.database_path.display(),
        export_dir = %config.export_dir.display(),
        queue_capacity = config.queue_capacity,
        "starting transdb gateway"
    );

    let engine = Arc::new(Engine::open(&config.database_path)?);
    let counts = engine.store().counts()?;
    info!(
        languages = counts.languages,
        domains = counts.domains,
        translations = counts.translations,
        "database opened"
    );

    let (queue, worker) =
        ExportWorker::spawn(engine.clone(), config.export_dir.clone(), config.queue_capacity);

    let state = AppState::new(engine, queue, config.clone());
    let app = create_router(state);

    // Set up graceful shutdown
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            // Keep the sender alive so the server is not shut down.
            std::future::pending::<()>().await;
        }
        info!("received shutdown signal");
        let _ = shutdown_tx.send(());
    });

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("gateway listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;

    let stats = worker.shutdown().await;
    info!(
        exported = stats.exported,
        failed = stats.failed,
        "gateway shutdown complete"
    );

    Ok(())
}
