//! Redis-backed delivery cache.
//!
//! Entries are stored as JSON under `message:<id>` with `SET ... EX`, so Redis
//! expires them without any sweeping on our side.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{MessageId, Timestamp};
use crate::ports::{cache_key, CacheError, CachedDelivery, MessageCache};

/// Stored value, kept compatible with other readers of the same keys.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    /// Unix seconds.
    sent_at: i64,
    message_id: String,
}

impl CacheRecord {
    fn from_entry(entry: &CachedDelivery) -> Self {
        Self {
            sent_at: entry.sent_at.as_unix_secs(),
            message_id: entry.provider_message_id.clone(),
        }
    }

    fn into_entry(self) -> Result<CachedDelivery, CacheError> {
        let sent_at = Timestamp::from_unix_secs(self.sent_at).ok_or_else(|| {
            CacheError::Serialization(format!("sent_at out of range: {}", self.sent_at))
        })?;
        Ok(CachedDelivery::new(sent_at, self.message_id))
    }
}

/// Redis implementation of [`MessageCache`].
#[derive(Clone)]
pub struct RedisMessageCache {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisMessageCache {
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl MessageCache for RedisMessageCache {
    async fn put(&self, id: &MessageId, entry: &CachedDelivery) -> Result<(), CacheError> {
        let key = cache_key(id);
        let value = serde_json::to_string(&CacheRecord::from_entry(entry))
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(&key)
            .arg(value)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Option<CachedDelivery>, CacheError> {
        let key = cache_key(id);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        match raw {
            Some(raw) => {
                let record: CacheRecord = serde_json::from_str(&raw)
                    .map_err(|e| CacheError::Serialization(e.to_string()))?;
                record.into_entry().map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_unix_seconds_and_message_id_fields() {
        let sent_at = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let entry = CachedDelivery::new(sent_at, "provider-123");

        let json = serde_json::to_value(CacheRecord::from_entry(&entry)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"sent_at": 1_700_000_000, "message_id": "provider-123"})
        );
    }

    #[test]
    fn record_parses_back_into_entry() {
        let record: CacheRecord =
            serde_json::from_str(r#"{"sent_at": 1700000000, "message_id": "abc"}"#).unwrap();

        let entry = record.into_entry().unwrap();

        assert_eq!(entry.sent_at.as_unix_secs(), 1_700_000_000);
        assert_eq!(entry.provider_message_id, "abc");
    }

    #[test]
    fn out_of_range_timestamp_is_a_serialization_error() {
        let record = CacheRecord {
            sent_at: i64::MAX,
            message_id: "abc".to_string(),
        };

        assert!(matches!(
            record.into_entry(),
            Err(CacheError::Serialization(_))
        ));
    }
}
