//! MessageCache port - Best-effort record of provider identifiers.
//!
//! The cache maps an internal message id to the time it was sent and the id
//! the provider assigned. It is a display and debugging aid only: the store's
//! sent flag stays authoritative, and every cache failure is non-fatal.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{MessageId, Timestamp};

/// Cached outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDelivery {
    pub sent_at: Timestamp,
    pub provider_message_id: String,
}

impl CachedDelivery {
    pub fn new(sent_at: Timestamp, provider_message_id: impl Into<String>) -> Self {
        Self {
            sent_at,
            provider_message_id: provider_message_id.into(),
        }
    }
}

/// Returns the cache key for a message (`message:<id>`).
pub fn cache_key(id: &MessageId) -> String {
    format!("message:{}", id)
}

/// Cache failures. Callers log these and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache entry malformed: {0}")]
    Serialization(String),
}

/// Port for the delivery cache.
#[async_trait]
pub trait MessageCache: Send + Sync {
    /// Stores an entry; it expires after the adapter's retention window.
    async fn put(&self, id: &MessageId, entry: &CachedDelivery) -> Result<(), CacheError>;

    /// Looks up an entry. Expired or missing entries return `Ok(None)`.
    async fn get(&self, id: &MessageId) -> Result<Option<CachedDelivery>, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_uses_message_prefix() {
        let id: MessageId = "2f1e4c38-8a1c-4a8e-9b4f-6a1d2e3f4a5b".parse().unwrap();
        assert_eq!(cache_key(&id), "message:2f1e4c38-8a1c-4a8e-9b4f-6a1d2e3f4a5b");
    }
}
