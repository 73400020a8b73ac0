use crate::{CoreResult, SessionError, platform::KeyValueStore};

use std::{
    collections::BTreeMap,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Key-value store backed by a single TOML table on disk.
///
/// Every `set` rewrites the whole file with the temp-file-then-rename
/// pattern so a crash mid-write never leaves a truncated table.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    /// Store values in the TOML file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_table(&self) -> CoreResult<BTreeMap<String, String>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(BTreeMap::new());
        }

        let contents = tokio::fs::read_to_string(&self.path).await?;

        toml::from_str(&contents).map_err(|e| SessionError::StorageError {
            reason: format!("Failed to parse {:?}: {}", self.path, e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn write_table(&self, table: &BTreeMap<String, String>) -> CoreResult<()> {
        let contents = toml::to_string_pretty(table).map_err(|e| SessionError::StorageError {
            reason: format!("Failed to serialize store: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("toml.tmp");

        let mut temp_file = tokio::fs::File::create(&temp_path).await?;
        temp_file.write_all(contents.as_bytes()).await?;
        temp_file.sync_all().await?;
        drop(temp_file);

        tokio::fs::rename(&temp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait(?Send)]
impl KeyValueStore for FileKeyValueStore {
    #[instrument(skip(self), fields(path = ?self.path))]
    async fn get(&mut self, key: &str) -> CoreResult<Option<String>> {
        let mut table = self.read_table().await?;
        Ok(table.remove(key))
    }

    #[instrument(skip(self, value), fields(path = ?self.path, value_len = value.len()))]
    async fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let mut table = self.read_table().await?;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table).await?;

        debug!("Store written (atomic write)");

        Ok(())
    }
}

/// In-process key-value store.
///
/// Clones share the same table, so a handle kept by the caller observes
/// writes made through a clone handed to the session.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryKeyValueStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.table().insert(key.to_string(), value.to_string());
        store
    }

    /// Value currently held under `key`.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.table().get(key).cloned()
    }

    fn table(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned table is still a valid map.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&mut self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.peek(key))
    }

    async fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        self.table().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
