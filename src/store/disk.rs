use crate::core::storage::LocalStorage;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "local_storage";

/// Local storage persisted in a fjall keyspace.
pub struct DiskStorage {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStorage {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create storage directory: {}", path.display()))?;
        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open storage at {}", path.display()))?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!(path = %path.display(), "Opened disk storage");
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl LocalStorage for DiskStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match self.partition.get(key)? {
            Some(value) => {
                debug!("Storage HIT for key: {key}");
                Ok(Some(String::from_utf8(value.to_vec()).with_context(|| {
                    format!("Stored value for key {key} is not valid UTF-8")
                })?))
            }
            None => {
                debug!("Storage MISS for key: {key}");
                Ok(None)
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.partition.insert(key, value)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!("Storage PUT for key: {key}");
        Ok(())
    }
}
