//! The chunk loader: single-flight fetches, waiter bookkeeping, settlement.
//!
//! One loader owns one chunk registry and one module store, both injected
//! at construction time, so independent loaders can coexist (and be
//! tested) without process-wide state. Requests never block: they either
//! complete against an already-loaded chunk, queue behind the flight in
//! progress, or start the one flight for a fresh chunk.

mod flight;

use std::sync::{Arc, Mutex};

use crate::asset_path::AssetPaths;
use crate::id::{ChunkId, ModuleId};
use crate::modules::{ModuleStore, Modules};
use crate::registry::{ChunkError, ChunkRegistry, RequestDecision, Waiter};
use crate::settlement::{ChunkPayload, SettlementListener};
use crate::transport::ChunkTransport;

/// Hook run when a settled payload delivers the designated entry module.
pub type EntryHook = Arc<dyn Fn(Modules) + Send + Sync>;

struct LoaderInner {
    registry: Mutex<ChunkRegistry>,
    store: Modules,
    listeners: Mutex<Vec<SettlementListener>>,
    paths: AssetPaths,
    transport: Arc<dyn ChunkTransport>,
    entry: Mutex<Option<(ModuleId, EntryHook)>>,
}

/// Handle to one loader instance. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct ChunkLoader {
    inner: Arc<LoaderInner>,
}

impl ChunkLoader {
    pub fn new(paths: AssetPaths, transport: Arc<dyn ChunkTransport>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                registry: Mutex::new(ChunkRegistry::new()),
                store: ModuleStore::new(),
                listeners: Mutex::new(Vec::new()),
                paths,
                transport,
                entry: Mutex::new(None),
            }),
        }
    }

    /// Shared handle to this loader's module store, the value success
    /// waiters receive.
    pub fn modules(&self) -> Modules {
        Arc::clone(&self.inner.store)
    }

    pub fn is_loaded(&self, id: &ChunkId) -> bool {
        self.inner.registry.lock().unwrap().is_loaded(id)
    }

    /// Registers a settlement observer. Observers accumulate in a list and
    /// run in registration order on every settlement; adding one never
    /// displaces those already installed.
    pub fn add_settlement_listener(&self, listener: SettlementListener) {
        self.inner.listeners.lock().unwrap().push(listener);
    }

    /// Designates the entry module: when a settled payload delivers it,
    /// `hook` runs after that settlement's waiters have drained.
    pub fn set_entry_hook(
        &self,
        module: ModuleId,
        hook: impl Fn(Modules) + Send + Sync + 'static,
    ) {
        *self.inner.entry.lock().unwrap() = Some((module, Arc::new(hook)));
    }

    /// Requests a chunk with an explicit waiter. Never blocks; the waiter
    /// fires exactly once: immediately if the chunk is already loaded,
    /// otherwise when its flight settles or fails. Must be called from
    /// within a tokio runtime, since a fresh chunk spawns its flight task.
    pub fn request_with(&self, id: ChunkId, waiter: Waiter) {
        let decision = {
            let mut registry = self.inner.registry.lock().unwrap();
            registry.request(id.clone(), waiter)
        };
        match decision {
            RequestDecision::AlreadyLoaded(waiter) => waiter(Ok(self.modules())),
            RequestDecision::Joined => {}
            RequestDecision::StartFlight => {
                tracing::debug!(chunk = %id, "starting chunk flight");
                tokio::spawn(flight::run(self.clone(), id));
            }
        }
    }

    /// Requests a chunk and resolves when it settles.
    pub async fn request(&self, id: ChunkId) -> Result<Modules, ChunkError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let chunk = id.clone();
        self.request_with(
            id,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ChunkError::load_failed(
                &chunk,
                "loader shut down before the chunk settled",
            )),
        }
    }

    /// Announces an arrived payload. Normally invoked by the chunk's own
    /// flight; callable directly for chunks delivered out of band (the
    /// entry chunk arrives that way).
    ///
    /// Order is fixed: every listed chunk flips to loaded and every module
    /// registers before any observer or waiter hears about it, so a waiter
    /// may rely on the whole batch being visible.
    pub fn settle(&self, payload: ChunkPayload) {
        let ready = {
            let mut registry = self.inner.registry.lock().unwrap();
            registry.settle(&payload.ids)
        };
        self.inner.store.insert_all(&payload.modules);

        let listeners: Vec<SettlementListener> =
            self.inner.listeners.lock().unwrap().clone();
        for listener in &listeners {
            listener(&payload.ids, &payload.modules);
        }

        let handle = self.modules();
        for waiter in ready {
            waiter(Ok(Arc::clone(&handle)));
        }

        let entry_hook = {
            let entry = self.inner.entry.lock().unwrap();
            entry.as_ref().and_then(|(module, hook)| {
                payload.modules.contains_key(module).then(|| Arc::clone(hook))
            })
        };
        if let Some(hook) = entry_hook {
            tracing::debug!("entry module delivered; running entry hook");
            hook(self.modules());
        }
    }
}
