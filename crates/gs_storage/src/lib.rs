use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use gs_core::{Error, Result};

pub mod backends;
pub mod history;

pub use backends::*;
pub use history::BatchHistoryStore;

/// String key-value persistence, shaped like a browser's local storage.
///
/// Backends report their failures; callers decide whether to swallow them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::Storage(format!("Unknown storage backend: {}", other))),
        }
    }
}

pub async fn create_storage(kind: StorageKind, path: Option<PathBuf>) -> Result<Arc<dyn KeyValueStore>> {
    let storage: Arc<dyn KeyValueStore> = match kind {
        StorageKind::Memory => Arc::new(MemoryStore::new()),
        StorageKind::File => Arc::new(JsonFileStore::new(
            path.unwrap_or_else(|| PathBuf::from(JsonFileStore::DEFAULT_PATH)),
        )),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => Arc::new(
            SqliteStore::new_with_path(&path.unwrap_or_else(|| PathBuf::from(SqliteStore::DEFAULT_PATH))).await?,
        ),
    };
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, BatchHistoryStore, KeyValueStore, StorageKind};
}
