use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;

/// String key-value persistence, shaped like browser storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items()?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.items()?.clear();
        Ok(())
    }
}

/// SQLite-backed store for sessions that outlive the process.
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> anyhow::Result<T>) -> anyhow::Result<T> {
        let db = self
            .db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        f(&db)
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.with_conn(|db| queries::get_value(db, key))
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.with_conn(|db| queries::set_value(db, key, value))
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.with_conn(|db| queries::delete_value(db, key).map(|_| ()))
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.with_conn(|db| queries::clear(db).map(|_| ()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    async fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get_item("bookings").await.unwrap(), None);
        store.set_item("bookings", "[]").await.unwrap();
        store.set_item("theme", "dark").await.unwrap();
        assert_eq!(store.get_item("bookings").await.unwrap().as_deref(), Some("[]"));

        store.remove_item("bookings").await.unwrap();
        assert_eq!(store.get_item("bookings").await.unwrap(), None);

        store.clear().await.unwrap();
        assert_eq!(store.get_item("theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn test_sqlite_store() {
        let store = SqliteStore::new(init_db(":memory:").unwrap());
        exercise(&store).await;
    }
}
