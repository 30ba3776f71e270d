use std::path::{Path, PathBuf};

use delight_core::messaging::{PrefsClient, channel};
use delight_core::store::FileStore;
use tokio::task::JoinHandle;

/// Request queue depth between the CLI and the preferences service
const QUEUE_CAPACITY: usize = 32;

/// Holds the shared state for one CLI invocation: the preferences service
/// running over the file store, and a client connected to it.
pub struct CliContext {
    pub client: PrefsClient,
    store_path: PathBuf,
    service: JoinHandle<FileStore>,
}

impl CliContext {
    /// Open the store (default location unless `path` is given) and start
    /// serving it.
    pub fn open(path: Option<&Path>) -> Result<Self, String> {
        let store = open_store(path)?;
        let store_path = store.path().to_path_buf();
        tracing::debug!(path = ?store_path, "Opened preferences store");

        let (client, service) = channel(store, QUEUE_CAPACITY);
        let service = tokio::spawn(service.run());

        Ok(Self {
            client,
            store_path,
            service,
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Drop the client, wait for queued writes, and return the store
    pub async fn shutdown(self) -> Result<FileStore, String> {
        drop(self.client);
        self.service.await.map_err(|e| e.to_string())
    }
}

pub fn open_store(path: Option<&Path>) -> Result<FileStore, String> {
    match path {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default(),
    }
    .map_err(|e| e.to_string())
}
