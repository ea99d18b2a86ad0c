use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use serde_json::Value;
use tracing::warn;
use vetapp_core::decode_address;

use crate::{validate, ActionError};

const PINNED_POOLS: &str = "pinned-gauges";
const MANUAL_POOLS: &str = "manual-pools";

/// Key-value storage for UI preferences, e.g. the browser's local storage.
/// Writes are best effort.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }
}

/// Pinned gauges and manually added pools, each stored as a JSON array of
/// address strings.
#[derive(Debug)]
pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Unreadable or malformed entries read as empty; non-string items are
    /// dropped.
    fn list(&self, key: &str) -> Vec<String> {
        let Some(raw) = self.store.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => {
                warn!(key, "ignoring malformed preference");
                Vec::new()
            }
        }
    }

    fn save(&self, key: &str, items: &[String]) {
        self.store.set(key, Value::from(items.to_vec()).to_string());
    }

    pub fn pinned_pools(&self) -> Vec<String> {
        self.list(PINNED_POOLS)
    }

    /// Pin or unpin `pool`; returns whether it is pinned afterwards.
    pub fn toggle_pinned(&self, pool: &str) -> bool {
        let mut pinned = self.pinned_pools();
        let now_pinned = match pinned.iter().position(|p| p == pool) {
            Some(index) => {
                pinned.remove(index);
                false
            }
            None => {
                pinned.push(pool.to_owned());
                true
            }
        };
        self.save(PINNED_POOLS, &pinned);
        now_pinned
    }

    pub fn manual_pools(&self) -> Vec<String> {
        self.list(MANUAL_POOLS)
    }

    /// Store `pool` in long form. Adding a pool twice is a no-op.
    pub fn add_manual_pool(&self, pool: &str) -> Result<String, ActionError> {
        let pool = decode_address(&validate::address("pool", pool)?);
        let mut pools = self.manual_pools();
        if !pools.contains(&pool) {
            pools.push(pool.clone());
            self.save(MANUAL_POOLS, &pools);
        }
        Ok(pool)
    }

    pub fn remove_manual_pool(&self, pool: &str) {
        let mut pools = self.manual_pools();
        pools.retain(|p| p != pool);
        self.save(MANUAL_POOLS, &pools);
    }
}
