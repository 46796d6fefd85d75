//! Key/value storage of JSON blobs, modelled on browser local storage.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Reads and decodes the blob under `key`; a missing key yields `T::default()`.
pub fn load_json<T>(storage: &dyn LocalStorage, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match storage.get_item(key)? {
        Some(blob) => serde_json::from_str(&blob)
            .with_context(|| format!("Failed to parse stored value for key: {key}")),
        None => {
            debug!(key, "No stored value");
            Ok(T::default())
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    storage: &dyn LocalStorage,
    key: &str,
    value: &T,
) -> Result<()> {
    let blob = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for key: {key}"))?;
    storage.set_item(key, &blob)
}
