//! One flight: fetch a chunk file, settle it, then run the completion
//! handler.
//!
//! The completion handler does not trust the transport outcome: success is
//! decided by asking the registry whether the chunk is loaded by the time
//! the handler runs. A well-formed payload settles its chunk before the
//! handler fires; anything else (transport error, bad status, unparseable
//! body, a payload that names different chunks) leaves the registry
//! untouched and is treated as a failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::id::ChunkId;
use crate::registry::ChunkError;
use crate::settlement::ChunkPayload;

use super::ChunkLoader;

/// Disarms on first use; duplicate completion signals do nothing.
pub(crate) struct CompletionGuard {
    fired: AtomicBool,
}

impl CompletionGuard {
    pub(crate) fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// True exactly once.
    pub(crate) fn disarm(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

pub(crate) async fn run(loader: ChunkLoader, id: ChunkId) {
    let guard = CompletionGuard::new();
    let outcome = fetch_and_settle(&loader, &id).await;
    complete(&loader, &id, &guard, outcome.err());
}

async fn fetch_and_settle(loader: &ChunkLoader, id: &ChunkId) -> Result<(), String> {
    let url = loader.inner.paths.chunk_url(id).map_err(|e| e.to_string())?;
    let transport = Arc::clone(&loader.inner.transport);
    let fetch_url = url.clone();
    let response = tokio::task::spawn_blocking(move || transport.get(&fetch_url, None))
        .await
        .map_err(|e| format!("fetch task failed: {}", e))?
        .map_err(|e| e.to_string())?;

    if !(200..300).contains(&response.status) {
        return Err(format!("GET {} returned HTTP {}", url, response.status));
    }
    let payload =
        ChunkPayload::parse(&response.body).map_err(|e| format!("bad chunk payload: {}", e))?;
    loader.settle(payload);
    Ok(())
}

/// Completion handler for one flight. Idempotent via `guard`; checks
/// loaded-state rather than the signal that got us here. On failure the
/// chunk's entry is removed entirely so a later request retries, and every
/// waiter hears the error once.
pub(crate) fn complete(
    loader: &ChunkLoader,
    id: &ChunkId,
    guard: &CompletionGuard,
    detail: Option<String>,
) {
    if !guard.disarm() {
        return;
    }
    let waiters = {
        let mut registry = loader.inner.registry.lock().unwrap();
        if registry.is_loaded(id) {
            if let Some(detail) = detail {
                tracing::warn!(chunk = %id, detail = %detail, "late error signal after settle; ignored");
            }
            return;
        }
        registry.fail(id)
    };
    let reason =
        detail.unwrap_or_else(|| "fetched payload did not settle the chunk".to_string());
    tracing::warn!(chunk = %id, reason = %reason, "chunk load failed; entry purged for retry");
    let err = ChunkError::load_failed(id, reason);
    for waiter in waiters {
        waiter(Err(err.clone()));
    }
}
