pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::storage::LocalStorage;
use anyhow::Result;
use disk::DiskStorage;

/// Opens the persistent storage under the configured data directory.
pub fn open_storage(config: &AppConfig) -> Result<Box<dyn LocalStorage>> {
    let path = config.data_path()?.join("storage");
    Ok(Box::new(DiskStorage::open(&path)?))
}
