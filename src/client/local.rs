// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-local key/value storage and the anonymous favorites store on top
//! of it.
//!
//! Storage calls are synchronous and never suspend, like browser storage.

use crate::client::store::{
    FavoriteItem, FavoritesError, FavoritesStore, RecipeSummary, StoreKind, FAVORITES_KEY,
};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt storage file: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key/value storage.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).map(|v| v.clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage kept in a single JSON object file mapping keys to values.
///
/// The whole file is rewritten on every change. A missing file reads as
/// empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(map)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut map = self.read_map()?;
        f(&mut map);
        self.write_map(&map)
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|map| {
            map.remove(key);
        })
    }
}

/// Anonymous favorites, kept as a JSON array under [`FAVORITES_KEY`].
pub struct LocalFavoritesStore {
    storage: Arc<dyn LocalStorage>,
    /// Serializes read-modify-write of the list
    write_lock: Mutex<()>,
}

impl LocalFavoritesStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Read the stored list. Unparseable contents count as an empty list so
    /// the next write replaces them.
    fn read_items(&self) -> Result<Vec<FavoriteItem>, FavoritesError> {
        let Some(raw) = self.storage.get_item(FAVORITES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable local favorites");
                Ok(Vec::new())
            }
        }
    }

    fn write_items(&self, items: &[FavoriteItem]) -> Result<(), FavoritesError> {
        let raw = serde_json::to_string(items).map_err(StorageError::from)?;
        self.storage.set_item(FAVORITES_KEY, &raw)?;
        Ok(())
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<FavoriteItem>) -> Result<T, FavoritesError>,
    ) -> Result<T, FavoritesError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| FavoritesError::Storage(StorageError::Poisoned))?;
        let mut items = self.read_items()?;
        let result = f(&mut items)?;
        self.write_items(&items)?;
        Ok(result)
    }
}

#[async_trait]
impl FavoritesStore for LocalFavoritesStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }

    async fn list(&self) -> Result<Vec<FavoriteItem>, FavoritesError> {
        self.read_items()
    }

    async fn add(&self, recipe: &RecipeSummary) -> Result<FavoriteItem, FavoritesError> {
        recipe.validate()?;
        self.modify(|items| {
            if items.iter().any(|i| i.id == recipe.id) {
                return Err(FavoritesError::AlreadyFavorited(recipe.id.clone()));
            }
            let item = FavoriteItem::new(recipe, chrono::Utc::now());
            items.push(item.clone());
            Ok(item)
        })
    }

    async fn remove(&self, recipe_id: &str) -> Result<(), FavoritesError> {
        self.modify(|items| {
            let before = items.len();
            items.retain(|i| i.id != recipe_id);
            if items.len() == before {
                return Err(FavoritesError::NotFavorited(recipe_id.to_string()));
            }
            Ok(())
        })
    }
}
