//! In-memory delivery cache for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::MessageId;
use crate::ports::{CacheError, CachedDelivery, MessageCache};

#[derive(Debug, Clone)]
struct Slot {
    entry: CachedDelivery,
    expires_at: Instant,
}

/// HashMap-backed [`MessageCache`] that honours the retention window.
///
/// Expiry is measured with `tokio::time::Instant`, so paused-clock tests can
/// advance past it. Can be switched to fail every call to exercise the
/// dispatcher's cache-failure path.
#[derive(Debug, Clone)]
pub struct InMemoryMessageCache {
    slots: Arc<RwLock<HashMap<MessageId, Slot>>>,
    ttl: Duration,
    failing: Arc<RwLock<bool>>,
}

impl InMemoryMessageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            failing: Arc::new(RwLock::new(false)),
        }
    }

    /// Makes every subsequent call fail with `CacheError::Unavailable`.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    /// Number of entries that have not yet expired.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check_available(&self) -> Result<(), CacheError> {
        if *self.failing.read().await {
            return Err(CacheError::Unavailable("cache switched off".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryMessageCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

#[async_trait]
impl MessageCache for InMemoryMessageCache {
    async fn put(&self, id: &MessageId, entry: &CachedDelivery) -> Result<(), CacheError> {
        self.check_available().await?;
        let now = Instant::now();
        let slot = Slot {
            entry: entry.clone(),
            expires_at: now + self.ttl,
        };

        let mut slots = self.slots.write().await;
        slots.retain(|_, slot| slot.expires_at > now);
        slots.insert(*id, slot);
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Option<CachedDelivery>, CacheError> {
        self.check_available().await?;
        let now = Instant::now();
        let mut slots = self.slots.write().await;

        match slots.get(id) {
            Some(slot) if slot.expires_at > now => Ok(Some(slot.entry.clone())),
            Some(_) => {
                slots.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
