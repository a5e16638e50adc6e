//! Chunk arrival: the payload a chunk file carries and the listener shape
//! settlement notifies.
//!
//! A chunk file is a JSON document naming the chunk ids it settles and the
//! modules it delivers. Feeding a parsed payload to the loader's settle
//! entry point is the arrival announcement; cooperating runtimes observe
//! arrivals through an explicit, ordered listener list instead of
//! overwriting a shared callback slot, so installing a second observer can
//! never clobber the first.

use std::sync::Arc;

use serde::Deserialize;

use crate::id::ChunkId;
use crate::modules::ModuleMap;

/// Parsed body of a chunk file.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkPayload {
    /// Chunk ids this file settles. Usually one; a merged delivery may
    /// settle several at once.
    pub ids: Vec<ChunkId>,
    /// Modules delivered alongside, keyed by module id.
    #[serde(default)]
    pub modules: ModuleMap,
}

impl ChunkPayload {
    pub fn new(ids: Vec<ChunkId>, modules: ModuleMap) -> Self {
        Self { ids, modules }
    }

    /// Parses a fetched chunk body.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Observer invoked on every settlement with the settled chunk ids and the
/// delivered module map, after registry and store updates and before
/// waiters drain. Listeners run in registration order.
pub type SettlementListener = Arc<dyn Fn(&[ChunkId], &ModuleMap) + Send + Sync>;
