//! Task store implementations for TaskPilot.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::InMemoryTaskStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteTaskStore;

use std::sync::Arc;
use taskpilot_config::{StoreBackend, StoreConfig};
use taskpilot_core::error::StoreError;
use taskpilot_core::task::TaskStore;

/// Open the store selected by configuration.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn TaskStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        #[cfg(feature = "sqlite")]
        StoreBackend::Sqlite => Ok(Arc::new(SqliteTaskStore::new(&config.database_url).await?)),
        #[cfg(not(feature = "sqlite"))]
        StoreBackend::Sqlite => Err(StoreError::Storage(
            "SQLite support was not compiled in".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_memory_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            database_url: String::new(),
        };
        let store = open(&config).await.unwrap();
        assert_eq!(store.name(), "in_memory");
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn open_sqlite_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            database_url: "sqlite::memory:".into(),
        };
        let store = open(&config).await.unwrap();
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
