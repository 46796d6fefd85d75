use crate::core::storage::LocalStorage;
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory storage, used by tests and when no data directory is available
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .inner
            .read()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        let value = items.get(key).cloned();
        if value.is_some() {
            debug!("Storage HIT for key: {key}");
        } else {
            debug!("Storage MISS for key: {key}");
        }
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .inner
            .write()
            .map_err(|_| anyhow!("Memory storage lock poisoned"))?;
        debug!("Storage PUT for key: {key}");
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
