//! Update notification queue.
//!
//! Successful translation writes enqueue their domain name; a background
//! worker drains the queue and re-exports each domain to the export
//! directory. The queue is bounded: once it is full, writers wait for the
//! worker to catch up. Export failures are logged and the worker moves on.
//!
//! On shutdown the queue is closed to new names, whatever is already
//! buffered is exported, and the worker stops.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use transdb_core::Engine;

/// The worker has stopped and no longer accepts domains.
#[derive(Debug, Error)]
#[error("export queue is closed")]
pub struct QueueClosed;

/// Producer handle. Cheap to clone.
#[derive(Clone)]
pub struct ExportQueue {
    tx: mpsc::Sender<String>,
}

impl ExportQueue {
    /// Queue a domain for export, waiting while the queue is full.
    pub async fn enqueue(&self, domain: impl Into<String>) -> Result<(), QueueClosed> {
        self.tx.send(domain.into()).await.map_err(|_| QueueClosed)
    }
}

/// Counters reported by a stopped worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub exported: u64,
    pub failed: u64,
}

/// Handle to the background export task.
pub struct ExportWorker {
    shutdown: broadcast::Sender<()>,
    handle: JoinHandle<ExportStats>,
}

impl ExportWorker {
    /// Start the worker. Returns the producer handle and the worker handle.
    pub fn spawn(engine: Arc<Engine>, export_dir: PathBuf, capacity: usize) -> (ExportQueue, Self) {
        let (queue, rx) = channel(capacity);
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(run(engine, export_dir, rx, shutdown_rx));
        (queue, Self { shutdown, handle })
    }

    /// Stop accepting domains, export what is buffered, and wait for the worker.
    pub async fn shutdown(self) -> ExportStats {
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(stats) => stats,
            Err(e) => {
                error!(error = %e, "export worker panicked");
                ExportStats::default()
            }
        }
    }
}

pub(crate) fn channel(capacity: usize) -> (ExportQueue, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ExportQueue { tx }, rx)
}

async fn run(
    engine: Arc<Engine>,
    export_dir: PathBuf,
    mut rx: mpsc::Receiver<String>,
    mut shutdown: broadcast::Receiver<()>,
) -> ExportStats {
    let mut stats = ExportStats::default();
    info!(dir = %export_dir.display(), "export worker started");

    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(domain) => export_one(&engine, &export_dir, domain, &mut stats).await,
                None => break,
            },
            _ = shutdown.recv() => {
                rx.close();
                while let Some(domain) = rx.recv().await {
                    export_one(&engine, &export_dir, domain, &mut stats).await;
                }
                break;
            }
        }
    }

    info!(
        exported = stats.exported,
        failed = stats.failed,
        "export worker stopped"
    );
    stats
}

async fn export_one(engine: &Arc<Engine>, dir: &Path, domain: String, stats: &mut ExportStats) {
    let task_engine = engine.clone();
    let task_dir = dir.to_path_buf();
    let name = domain.clone();
    let result =
        tokio::task::spawn_blocking(move || task_engine.export_domain(&name, &task_dir)).await;

    match result {
        Ok(Ok(files)) => {
            stats.exported += 1;
            debug!(domain = %domain, files = files.len(), "domain re-exported");
        }
        Ok(Err(e)) => {
            stats.failed += 1;
            error!(domain = %domain, error = %e, "export failed");
        }
        Err(e) => {
            stats.failed += 1;
            error!(domain = %domain, error = %e, "export task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;
    use transdb_core::DomainFile;

    fn engine() -> Arc<Engine> {
        let engine = Engine::open_in_memory().unwrap();
        engine.add_language("fr", "French").unwrap();
        for name in ["a", "b", "c"] {
            engine
                .import_domain(&DomainFile::new(name, "fr").with_unit("hello", "Bonjour"))
                .unwrap();
        }
        Arc::new(engine)
    }

    #[tokio::test]
    async fn test_shutdown_drains_buffered_domains() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, worker) = ExportWorker::spawn(engine(), dir.path().to_path_buf(), 10);

        for name in ["a", "b", "c"] {
            queue.enqueue(name).await.unwrap();
        }
        let stats = worker.shutdown().await;

        assert_eq!(stats, ExportStats { exported: 3, failed: 0 });
        for name in ["a", "b", "c"] {
            assert!(dir.path().join(format!("{name}.fr.xliff")).exists());
        }
        assert!(queue.enqueue("a").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_export_does_not_stop_worker() {
        let dir = tempfile::tempdir().unwrap();
        let (queue, worker) = ExportWorker::spawn(engine(), dir.path().to_path_buf(), 10);

        queue.enqueue("missing").await.unwrap();
        queue.enqueue("a").await.unwrap();
        let stats = worker.shutdown().await;

        assert_eq!(stats, ExportStats { exported: 1, failed: 1 });
        assert!(dir.path().join("a.fr.xliff").exists());
    }

    #[tokio::test]
    async fn test_full_queue_blocks_producer() {
        let (queue, mut rx) = channel(1);
        queue.enqueue("a").await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), queue.enqueue("b")).await;
        assert!(blocked.is_err(), "enqueue should wait while the queue is full");

        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        queue.enqueue("b").await.unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("b"));
    }
}
