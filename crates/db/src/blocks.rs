use std::sync::Arc;

use blockbot_core::domain::block::{BlockRecord, BlockRole, UserId, UserTotals};
use tracing::debug;

use crate::store::{KeyValueStore, StoreError};

pub const BLOCKER_KEY: &str = "blocker";
pub const BLOCKED_KEY: &str = "blocked";
pub const TIME_BLOCKED_KEY: &str = "time_blocked";

pub fn user_totals_key(user: &UserId) -> String {
    format!("user:{}", user.as_str())
}

/// Reads and writes the single global block record and per-user totals.
#[derive(Clone)]
pub struct BlockStore {
    store: Arc<dyn KeyValueStore>,
}

impl BlockStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// `None` whenever the `blocker` key is absent or empty.
    pub async fn current_block(&self) -> Result<Option<BlockRecord>, StoreError> {
        let blocker = match self.store.get(BLOCKER_KEY).await? {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(None),
        };

        let blocked = self
            .store
            .get(BLOCKED_KEY)
            .await?
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                StoreError::Decode(format!("`{BLOCKED_KEY}` is missing while `{BLOCKER_KEY}` is set"))
            })?;

        let raw_time = self.store.get(TIME_BLOCKED_KEY).await?.ok_or_else(|| {
            StoreError::Decode(format!("`{TIME_BLOCKED_KEY}` is missing while `{BLOCKER_KEY}` is set"))
        })?;
        let blocked_at = raw_time.trim().parse::<i64>().map_err(|_| {
            StoreError::Decode(format!("`{TIME_BLOCKED_KEY}` is not an epoch timestamp: `{raw_time}`"))
        })?;

        Ok(Some(BlockRecord::new(UserId(blocker), UserId(blocked), blocked_at)))
    }

    /// Writes the three record keys one after another.
    pub async fn create_block(&self, record: &BlockRecord) -> Result<(), StoreError> {
        self.store.set(BLOCKED_KEY, record.blocked.as_str()).await?;
        self.store.set(BLOCKER_KEY, record.blocker.as_str()).await?;
        self.store.set(TIME_BLOCKED_KEY, &record.blocked_at_epoch_seconds.to_string()).await?;
        Ok(())
    }

    pub async fn clear_block(&self) -> Result<(), StoreError> {
        let removed = self.store.delete(&[BLOCKER_KEY, BLOCKED_KEY, TIME_BLOCKED_KEY]).await?;
        debug!(removed, "cleared block record keys");
        Ok(())
    }

    /// Adds `seconds` to the user's running total for `role` and returns the new total.
    pub async fn add_time(
        &self,
        user: &UserId,
        role: BlockRole,
        seconds: u64,
    ) -> Result<u64, StoreError> {
        let key = user_totals_key(user);
        let field = role.as_field();
        let current = match self.store.hash_get(&key, field).await? {
            Some(raw) => parse_total(&key, field, &raw)?,
            None => 0,
        };

        let updated = current.saturating_add(seconds);
        self.store.hash_set(&key, field, &updated.to_string()).await?;
        Ok(updated)
    }

    pub async fn totals_for(&self, user: &UserId) -> Result<UserTotals, StoreError> {
        let key = user_totals_key(user);
        let fields = self.store.hash_get_all(&key).await?;

        let read = |role: BlockRole| -> Result<u64, StoreError> {
            let field = role.as_field();
            fields.get(field).map_or(Ok(0), |raw| parse_total(&key, field, raw))
        };

        Ok(UserTotals {
            total_time_blocked: read(BlockRole::Blocked)?,
            total_time_blocking: read(BlockRole::Blocking)?,
        })
    }
}

fn parse_total(key: &str, field: &str, raw: &str) -> Result<u64, StoreError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| StoreError::Decode(format!("`{key}.{field}` is not a whole number: `{raw}`")))
}
