//! Persistent store adapter.
//!
//! Local storage is the authoritative copy for the running session. The remote mirror is
//! read once at startup and written opportunistically after every local save.

mod remote;

pub use remote::*;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::db::KeyValueStore;
use crate::errors::AppError;
use crate::models::{BusinessOwner, OwnersDocument};

/// Local storage key holding the owners document.
pub const STORAGE_KEY: &str = "employeeRegistration";

/// Result of a startup load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedOwners {
    pub owners: Vec<BusinessOwner>,
    /// `false` when the local slot held data that could not be read in full. Writing
    /// `owners` back would then overwrite records that were skipped.
    pub local_intact: bool,
}

/// Reads and writes the owners collection.
#[derive(Clone)]
pub struct PersistentStore {
    local: Arc<dyn KeyValueStore>,
    remote: Option<Arc<dyn RemoteMirror>>,
    sync_queue: Option<mpsc::UnboundedSender<OwnersDocument>>,
}

impl PersistentStore {
    pub fn new(local: Arc<dyn KeyValueStore>) -> Self {
        Self {
            local,
            remote: None,
            sync_queue: None,
        }
    }

    /// Attach a remote mirror. Spawns the task that pushes saved documents to it, so this
    /// must run inside a tokio runtime.
    pub fn with_remote(mut self, remote: Arc<dyn RemoteMirror>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_mirror_sync(Arc::clone(&remote), rx));
        self.remote = Some(remote);
        self.sync_queue = Some(tx);
        self
    }

    /// Load the owners collection.
    ///
    /// A non-empty local copy always wins over the remote one. Never fails: unreadable or
    /// malformed data degrades to an empty collection.
    pub async fn load(&self) -> LoadedOwners {
        let Some(remote) = &self.remote else {
            return self.read_local().await;
        };

        match remote.fetch().await {
            Ok(document) => {
                let local = self.read_local().await;
                if !local.owners.is_empty() {
                    tracing::debug!(
                        "Using {} local owners over {} remote owners",
                        local.owners.len(),
                        document.owners.len()
                    );
                    local
                } else {
                    tracing::info!("Adopting {} owners from remote mirror", document.owners.len());
                    LoadedOwners {
                        owners: document.owners,
                        local_intact: local.local_intact,
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Could not load remote mirror, using local data: {}", e);
                self.read_local().await
            }
        }
    }

    /// Write the owners collection locally, then queue it for the mirror.
    ///
    /// Only the local write is reported to the caller.
    pub async fn save(&self, owners: &[BusinessOwner]) -> Result<(), AppError> {
        let document = OwnersDocument::new(owners.to_vec());
        let payload = serde_json::to_string(&document)
            .map_err(|e| AppError::Internal(format!("Failed to encode owners: {}", e)))?;

        self.local.set_item(STORAGE_KEY, &payload).await?;
        tracing::debug!("Saved {} owners to local storage", owners.len());

        if let Some(queue) = &self.sync_queue {
            if queue.send(document).is_err() {
                tracing::warn!("Mirror sync task has stopped, skipping remote push");
            }
        }

        Ok(())
    }

    /// Read the local copy. Owners that do not match the schema are logged and skipped.
    async fn read_local(&self) -> LoadedOwners {
        let stored = match self.local.get_item(STORAGE_KEY).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return LoadedOwners::intact(Vec::new()),
            Err(e) => {
                tracing::warn!("Failed to read local storage: {}", e);
                return LoadedOwners::unreadable();
            }
        };

        let document = match serde_json::from_str::<Value>(&stored) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Failed to parse stored data: {}", e);
                return LoadedOwners::unreadable();
            }
        };

        let records = match document.get("owners") {
            Some(Value::Array(records)) => records,
            None => return LoadedOwners::intact(Vec::new()),
            Some(_) => {
                tracing::warn!("Stored data has no owners list");
                return LoadedOwners::unreadable();
            }
        };

        let mut owners = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (index, record) in records.iter().enumerate() {
            match serde_json::from_value::<BusinessOwner>(record.clone()) {
                Ok(owner) => owners.push(owner),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!("Skipping stored owner #{}: {}", index, e);
                }
            }
        }

        LoadedOwners {
            owners,
            local_intact: skipped == 0,
        }
    }
}

impl LoadedOwners {
    fn intact(owners: Vec<BusinessOwner>) -> Self {
        Self {
            owners,
            local_intact: true,
        }
    }

    fn unreadable() -> Self {
        Self {
            owners: Vec::new(),
            local_intact: false,
        }
    }
}

/// Push queued documents one at a time, in save order.
async fn run_mirror_sync(
    remote: Arc<dyn RemoteMirror>,
    mut queue: mpsc::UnboundedReceiver<OwnersDocument>,
) {
    while let Some(mut document) = queue.recv().await {
        // Only the newest queued document matters.
        while let Ok(newer) = queue.try_recv() {
            document = newer;
        }
        if let Err(e) = remote.push(&document).await {
            tracing::warn!("Could not sync with remote mirror: {}", e);
        }
    }
    tracing::debug!("Mirror sync task stopped");
}
