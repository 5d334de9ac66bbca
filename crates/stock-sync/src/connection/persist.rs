//! Write-through copy of the collection on disk.
//!
//! The collection bumps a revision after every change. A background task
//! waits on that revision and rewrites the data file with the whole
//! collection. Bursts of changes coalesce into one write.

use super::ConnectionError;
use crate::clients::ProductClient;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Replaces the data file with the current collection.
struct Snapshot {
    products: ProductClient,
    path: PathBuf,
    // Serializes writers; each one reads the collection under the lock, so a
    // later write never carries older data.
    lock: Mutex<()>,
}

impl Snapshot {
    async fn write(&self) -> Result<usize, ConnectionError> {
        let _guard = self.lock.lock().await;
        let products = self.products.all_products().await?;
        let json = serde_json::to_vec_pretty(&products).map_err(|e| self.error(e))?;

        let staging = staging_path(&self.path);
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| self.error(e))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| self.error(e))?;
        Ok(products.len())
    }

    fn error(&self, e: impl std::fmt::Display) -> ConnectionError {
        ConnectionError::Persist(format!("{}: {e}", self.path.display()))
    }
}

pub(crate) struct Persister {
    snapshot: Arc<Snapshot>,
    task: JoinHandle<()>,
}

impl Persister {
    /// Starts writing `path` whenever `changes` moves.
    ///
    /// A revision already pending in `changes` is written right away.
    pub(crate) fn spawn(
        products: ProductClient,
        path: PathBuf,
        changes: watch::Receiver<u64>,
    ) -> Self {
        info!(path = %path.display(), "Write-through enabled");
        let snapshot = Arc::new(Snapshot {
            products,
            path,
            lock: Mutex::new(()),
        });
        let task = tokio::spawn(write_through(snapshot.clone(), changes));
        Self { snapshot, task }
    }

    /// Writes the collection now.
    pub(crate) async fn flush(&self) -> Result<usize, ConnectionError> {
        self.snapshot.write().await
    }

    /// Waits for the write-through task. It ends once the collection stops.
    pub(crate) async fn finish(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Write-through task failed");
        }
    }
}

async fn write_through(snapshot: Arc<Snapshot>, mut changes: watch::Receiver<u64>) {
    while changes.changed().await.is_ok() {
        let revision = *changes.borrow_and_update();
        match snapshot.write().await {
            Ok(count) => debug!(revision, count, "Change persisted"),
            // The collection stopped after close wrote its final snapshot.
            Err(e) if snapshot.products.is_closed() => {
                debug!(revision, error = %e, "Collection closed before write")
            }
            Err(e) => warn!(revision, error = %e, "Failed to persist change"),
        }
    }
    debug!(path = %snapshot.path.display(), "Write-through stopped");
}

/// `catalog.json` is staged as `catalog.json.tmp` and renamed into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_is_a_sibling() {
        assert_eq!(
            staging_path(Path::new("var/catalog.json")),
            PathBuf::from("var/catalog.json.tmp")
        );
    }
}
