use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::Row;

use super::{KeyValueStore, StoreError};
use crate::DbPool;

/// Key-value store persisted in the `kv_entry` / `kv_hash_field` sqlite tables.
#[derive(Clone)]
pub struct SqlKeyValueStore {
    pool: DbPool,
}

impl SqlKeyValueStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl KeyValueStore for SqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entry WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_entry (key, value, updated_at)
             VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut removed = 0;

        for key in keys {
            let strings = sqlx::query("DELETE FROM kv_entry WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let fields = sqlx::query("DELETE FROM kv_hash_field WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            if strings + fields > 0 {
                removed += 1;
            }
        }

        tx.commit().await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT
                EXISTS(SELECT 1 FROM kv_entry WHERE key = ?)
                OR EXISTS(SELECT 1 FROM kv_hash_field WHERE key = ?) AS present",
        )
        .bind(key)
        .bind(key)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<bool, _>("present")?)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_hash_field WHERE key = ? AND field = ?",
        )
        .bind(key)
        .bind(field)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn hash_get_all(&self, key: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let rows = sqlx::query("SELECT field, value FROM kv_hash_field WHERE key = ?")
            .bind(key)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<(String, String), StoreError> {
                Ok((row.try_get("field")?, row.try_get("value")?))
            })
            .collect()
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_hash_field (key, field, value, updated_at)
             VALUES (?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
             ON CONFLICT(key, field) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::store::{KeyValueStore, SqlKeyValueStore};
    use crate::{connect_with_settings, migrations};

    async fn store() -> SqlKeyValueStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlKeyValueStore::new(pool)
    }

    #[tokio::test]
    async fn set_overwrites_existing_value() {
        let store = store().await;

        store.set("blocker", "U2").await.expect("set");
        store.set("blocker", "U3").await.expect("overwrite");

        assert_eq!(store.get("blocker").await.expect("get").as_deref(), Some("U3"));
        store.pool().close().await;
    }

    #[tokio::test]
    async fn delete_removes_all_listed_keys_together() {
        let store = store().await;
        store.set("blocker", "U2").await.expect("set");
        store.set("blocked", "U1").await.expect("set");
        store.set("time_blocked", "100").await.expect("set");

        let removed =
            store.delete(&["blocker", "blocked", "time_blocked", "absent"]).await.expect("delete");

        assert_eq!(removed, 3);
        for key in ["blocker", "blocked", "time_blocked"] {
            assert!(!store.exists(key).await.expect("exists"), "{key} should be gone");
        }
        store.pool().close().await;
    }

    #[tokio::test]
    async fn field_maps_round_trip_through_sqlite() {
        let store = store().await;

        assert!(!store.exists("user:U1").await.expect("exists"));
        store.hash_set("user:U1", "total_time_blocked", "10").await.expect("hset");
        store.hash_set("user:U1", "total_time_blocked", "25").await.expect("hset");
        store.hash_set("user:U1", "total_time_blocking", "7").await.expect("hset");

        assert!(store.exists("user:U1").await.expect("exists"));
        assert_eq!(
            store.hash_get("user:U1", "total_time_blocked").await.expect("hget").as_deref(),
            Some("25")
        );
        let all = store.hash_get_all("user:U1").await.expect("hgetall");
        assert_eq!(all.get("total_time_blocking").map(String::as_str), Some("7"));
        assert_eq!(all.len(), 2);
        store.pool().close().await;
    }
}
