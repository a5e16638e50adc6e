//! The notification contract between a chunk request and its caller.

use thiserror::Error;

use crate::id::ChunkId;
use crate::modules::Modules;

/// Error delivered to every waiter of a failed chunk load.
///
/// Covers transport failures, bad HTTP statuses, unparseable payloads and
/// payloads that never settled the chunk they were fetched for. The caller
/// cannot tell these apart and reacts the same way: the entry is purged, so
/// a later request retries from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("chunk {chunk} failed to load: {reason}")]
    LoadFailed { chunk: ChunkId, reason: String },
}

impl ChunkError {
    pub(crate) fn load_failed(chunk: &ChunkId, reason: impl Into<String>) -> Self {
        ChunkError::LoadFailed {
            chunk: chunk.clone(),
            reason: reason.into(),
        }
    }
}

/// One pending notification for one in-flight chunk: invoked exactly once
/// with the shared module store on success, or the load error. The async
/// request API wraps one of these around a oneshot channel.
pub type Waiter = Box<dyn FnOnce(Result<Modules, ChunkError>) + Send + 'static>;
