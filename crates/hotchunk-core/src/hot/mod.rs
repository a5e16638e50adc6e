//! Hot-update polling: manifest checks and update-chunk application.
//!
//! Both operations are externally triggered; nothing here schedules
//! itself. A manifest check asks whether a newer build exists; an update
//! download fetches one changed chunk and merges its modules into the live
//! store. Update observers register on a [`HotUpdateHub`] list, mirroring
//! the settlement listener rule: registration order, never clobbered.

mod manifest;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::asset_path::{AssetPathError, AssetPaths};
use crate::id::{ChunkId, ModuleId};
use crate::modules::{ModuleMap, Modules};
use crate::transport::{ChunkTransport, TransportError};

pub use manifest::UpdateManifest;

/// Fixed bound on one manifest request.
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Manifest check failure. A missing manifest (404) is not one of these;
/// it comes back as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("networking unavailable for manifest check")]
    Unsupported,
    #[error("manifest request to {url} timed out")]
    TimedOut { url: String },
    #[error("manifest request to {url} failed with HTTP {status}")]
    RequestFailed { url: String, status: u32 },
    #[error("manifest from {url} is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest request failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    AssetPath(#[from] AssetPathError),
}

/// Failure fetching or applying one hot-update chunk.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    AssetPath(#[from] AssetPathError),
    #[error("update request failed: {0}")]
    Transport(#[from] TransportError),
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u32 },
    #[error("bad hot-update payload from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed body of a hot-update chunk file: the chunk it refreshes and the
/// replacement modules.
#[derive(Debug, Clone, Deserialize)]
pub struct HotUpdatePayload {
    pub id: ChunkId,
    #[serde(default)]
    pub modules: ModuleMap,
}

/// Observer of applied hot updates.
pub type HotUpdateListener = Arc<dyn Fn(&ChunkId, &ModuleMap) + Send + Sync>;

/// Ordered list of hot-update observers.
#[derive(Default)]
pub struct HotUpdateHub {
    listeners: Mutex<Vec<HotUpdateListener>>,
}

impl HotUpdateHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer behind those already installed.
    pub fn add_listener(&self, listener: HotUpdateListener) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn notify(&self, chunk: &ChunkId, modules: &ModuleMap) {
        let listeners: Vec<HotUpdateListener> = self.listeners.lock().unwrap().clone();
        for listener in &listeners {
            listener(chunk, modules);
        }
    }
}

/// One manifest check with the standard 10 s bound.
pub async fn check_manifest(
    transport: Arc<dyn ChunkTransport>,
    paths: &AssetPaths,
) -> Result<Option<UpdateManifest>, ManifestError> {
    check_manifest_with_timeout(transport, paths, MANIFEST_TIMEOUT).await
}

/// One manifest check. `Ok(None)` means no update is published for the
/// current build hash.
pub async fn check_manifest_with_timeout(
    transport: Arc<dyn ChunkTransport>,
    paths: &AssetPaths,
    timeout: Duration,
) -> Result<Option<UpdateManifest>, ManifestError> {
    let url = paths.manifest_url()?;
    tracing::debug!(url = %url, "checking hot-update manifest");
    let fetch_url = url.clone();
    let outcome = tokio::task::spawn_blocking(move || transport.get(&fetch_url, Some(timeout)))
        .await
        .map_err(|e| TransportError::Other(format!("manifest task failed: {}", e)))?;
    let response = match outcome {
        Ok(response) => response,
        Err(TransportError::Timeout) => return Err(ManifestError::TimedOut { url }),
        Err(TransportError::Unsupported) => return Err(ManifestError::Unsupported),
        Err(e) => return Err(ManifestError::Transport(e)),
    };
    manifest::map_status(&url, &response)
}

/// Downloads one hot-update chunk, merges its modules into `store`, and
/// notifies `hub`. No registry bookkeeping: hot updates replace modules of
/// chunks that are already live. Returns the applied module ids.
pub async fn download_update(
    transport: Arc<dyn ChunkTransport>,
    paths: &AssetPaths,
    store: &Modules,
    hub: &HotUpdateHub,
    id: &ChunkId,
) -> Result<Vec<ModuleId>, UpdateError> {
    let url = paths.hot_update_chunk_url(id)?;
    tracing::debug!(chunk = %id, url = %url, "downloading hot-update chunk");
    let fetch_url = url.clone();
    let response = tokio::task::spawn_blocking(move || transport.get(&fetch_url, None))
        .await
        .map_err(|e| TransportError::Other(format!("update task failed: {}", e)))??;
    if !(200..300).contains(&response.status) {
        return Err(UpdateError::Status {
            url,
            status: response.status,
        });
    }
    let payload: HotUpdatePayload =
        serde_json::from_slice(&response.body).map_err(|source| UpdateError::Parse {
            url,
            source,
        })?;

    let applied: Vec<ModuleId> = payload.modules.keys().cloned().collect();
    store.insert_all(&payload.modules);
    hub.notify(&payload.id, &payload.modules);
    tracing::info!(chunk = %payload.id, modules = applied.len(), "hot update applied");
    Ok(applied)
}
