//! Module store: module id -> delivered source payload.
//!
//! Populated as a side effect of chunk arrival, before the owning chunk is
//! declared loaded. Evaluation of the stored source is someone else's job;
//! the store only guarantees that everything a settled chunk delivered is
//! visible to whoever got the success notification.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::id::ModuleId;

/// Source payload of one module, as delivered inside a chunk file.
/// Transparent so module maps serialize as plain `{ "id": "source" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSource {
    pub source: String,
}

impl ModuleSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Map of delivered modules, as carried by chunk and hot-update payloads.
pub type ModuleMap = BTreeMap<ModuleId, ModuleSource>;

/// Shared handle to a [`ModuleStore`]; the value success waiters receive.
pub type Modules = Arc<ModuleStore>;

/// Process-local registry of delivered modules, owned by one loader.
#[derive(Debug, Default)]
pub struct ModuleStore {
    modules: Mutex<ModuleMap>,
}

impl ModuleStore {
    pub fn new() -> Modules {
        Arc::new(Self::default())
    }

    /// Registers one module, replacing any previous payload for the id.
    /// Replacement is what a hot update does.
    pub fn insert(&self, id: ModuleId, source: ModuleSource) {
        self.modules.lock().unwrap().insert(id, source);
    }

    /// Merges a whole delivered map into the store.
    pub fn insert_all(&self, modules: &ModuleMap) {
        let mut guard = self.modules.lock().unwrap();
        for (id, source) in modules {
            guard.insert(id.clone(), source.clone());
        }
    }

    pub fn get(&self, id: &ModuleId) -> Option<ModuleSource> {
        self.modules.lock().unwrap().get(id).cloned()
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.lock().unwrap().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.lock().unwrap().is_empty()
    }

    /// Ids currently registered, in key order.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.lock().unwrap().keys().cloned().collect()
    }
}
