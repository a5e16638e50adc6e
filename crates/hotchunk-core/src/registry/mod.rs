//! Chunk state bookkeeping.
//!
//! A chunk id is in exactly one of three states: absent (never requested,
//! or purged after a failure), loading (ordered waiter list, one flight in
//! progress), or loaded (sentinel, waiters already drained). The registry
//! only mutates state and hands waiters back; invoking them is the
//! loader's job, outside the lock.

mod waiter;

use std::collections::HashMap;

use crate::id::ChunkId;

pub use waiter::{ChunkError, Waiter};

/// What a request call should do next, decided atomically with the state
/// transition that records it.
pub enum RequestDecision {
    /// Chunk already loaded; notify this waiter right away.
    AlreadyLoaded(Waiter),
    /// A flight is in progress; the waiter has been queued behind it.
    Joined,
    /// First request for this chunk; the caller must start the one flight.
    StartFlight,
}

enum ChunkSlot {
    /// Flight in progress; waiters in registration order.
    Loading(Vec<Waiter>),
    /// Sentinel: code arrived and was registered.
    Loaded,
}

/// Per-loader map of chunk id -> load state.
#[derive(Default)]
pub struct ChunkRegistry {
    slots: HashMap<ChunkId, ChunkSlot>,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, id: &ChunkId) -> bool {
        matches!(self.slots.get(id), Some(ChunkSlot::Loaded))
    }

    pub fn is_loading(&self, id: &ChunkId) -> bool {
        matches!(self.slots.get(id), Some(ChunkSlot::Loading(_)))
    }

    /// Records a request for `id` and says what the caller must do.
    pub fn request(&mut self, id: ChunkId, waiter: Waiter) -> RequestDecision {
        match self.slots.get_mut(&id) {
            Some(ChunkSlot::Loaded) => RequestDecision::AlreadyLoaded(waiter),
            Some(ChunkSlot::Loading(waiters)) => {
                waiters.push(waiter);
                RequestDecision::Joined
            }
            None => {
                self.slots.insert(id, ChunkSlot::Loading(vec![waiter]));
                RequestDecision::StartFlight
            }
        }
    }

    /// Marks every listed chunk loaded and returns all their pending
    /// waiters in one combined list (per-chunk FIFO preserved, chunks in
    /// the order the payload listed them). Ids that were never requested
    /// are still marked loaded; the entry chunk arrives that way.
    pub fn settle(&mut self, ids: &[ChunkId]) -> Vec<Waiter> {
        let mut ready = Vec::new();
        for id in ids {
            if let Some(ChunkSlot::Loading(waiters)) =
                self.slots.insert(id.clone(), ChunkSlot::Loaded)
            {
                ready.extend(waiters);
            }
        }
        ready
    }

    /// Removes a failed chunk's entry entirely and returns its waiters.
    ///
    /// Removal (not a poisoned sentinel) is what lets the next request for
    /// the same id start a fresh flight. A loaded chunk is left alone, so
    /// calling this after a successful settle is harmless.
    pub fn fail(&mut self, id: &ChunkId) -> Vec<Waiter> {
        match self.slots.remove(id) {
            Some(ChunkSlot::Loading(waiters)) => waiters,
            Some(ChunkSlot::Loaded) => {
                self.slots.insert(id.clone(), ChunkSlot::Loaded);
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}
