//! User-curated favorite currency pairs.

use crate::core::currency::Pair;
use crate::core::storage::{LocalStorage, load_json, save_json};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FAVORITES_KEY: &str = "currencyFavorites";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    pairs: Vec<Pair>,
}

impl Favorites {
    pub fn load(storage: &dyn LocalStorage) -> Result<Self> {
        load_json(storage, FAVORITES_KEY)
    }

    pub fn save(&self, storage: &dyn LocalStorage) -> Result<()> {
        save_json(storage, FAVORITES_KEY, self)
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.iter().any(|p| p == pair)
    }

    /// Appends `pair` unless already present. Returns whether it was added.
    pub fn add(&mut self, pair: Pair) -> bool {
        if self.contains(&pair) {
            debug!(%pair, "Favorite already present");
            return false;
        }
        self.pairs.push(pair);
        true
    }

    /// Returns whether a pair was removed.
    pub fn remove(&mut self, pair: &Pair) -> bool {
        let before = self.pairs.len();
        self.pairs.retain(|p| p != pair);
        self.pairs.len() != before
    }

    pub fn get(&self, index: usize) -> Option<&Pair> {
        self.pairs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Loads, adds and persists. Returns whether the list changed.
pub fn add_favorite(storage: &dyn LocalStorage, pair: Pair) -> Result<bool> {
    let mut favorites = Favorites::load(storage)?;
    let added = favorites.add(pair);
    if added {
        favorites.save(storage)?;
    }
    Ok(added)
}

/// Loads, removes and persists. Returns whether the list changed.
pub fn remove_favorite(storage: &dyn LocalStorage, pair: &Pair) -> Result<bool> {
    let mut favorites = Favorites::load(storage)?;
    let removed = favorites.remove(pair);
    if removed {
        favorites.save(storage)?;
    }
    Ok(removed)
}
