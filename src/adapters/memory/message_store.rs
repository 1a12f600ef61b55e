//! In-memory message store implementing both the repository and reader ports.
//!
//! Used by tests and by local runs without PostgreSQL. Insertion order breaks
//! ties between messages created at the same instant.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::message::{Message, MessageError};
use crate::ports::{MessageReader, MessageRepository, PageRequest, SentMessagePage};

#[derive(Debug, Default)]
struct StoreState {
    messages: Vec<Message>,
    fail_fetch: bool,
    fail_mark_sent: bool,
    fail_list_sent: bool,
}

/// Shared, cloneable in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `messages`.
    pub async fn with_messages(messages: Vec<Message>) -> Self {
        let store = Self::new();
        store.state.write().await.messages = messages;
        store
    }

    /// Snapshot of every stored message, deleted ones included.
    pub async fn all(&self) -> Vec<Message> {
        self.state.read().await.messages.clone()
    }

    /// Soft-deletes a message, hiding it from every port operation.
    pub async fn soft_delete(&self, id: &MessageId) -> Result<(), MessageError> {
        let mut state = self.state.write().await;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id() == *id && !m.is_deleted())
            .ok_or_else(|| MessageError::not_found(*id))?;
        message.soft_delete(Timestamp::now());
        Ok(())
    }

    /// Makes `fetch_unsent` fail until switched back.
    pub async fn set_fail_fetch(&self, fail: bool) {
        self.state.write().await.fail_fetch = fail;
    }

    /// Makes `mark_sent` fail until switched back.
    pub async fn set_fail_mark_sent(&self, fail: bool) {
        self.state.write().await.fail_mark_sent = fail;
    }

    /// Makes `list_sent` fail until switched back.
    pub async fn set_fail_list_sent(&self, fail: bool) {
        self.state.write().await.fail_list_sent = fail;
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageStore {
    async fn fetch_unsent(&self, limit: u32) -> Result<Vec<Message>, MessageError> {
        let state = self.state.read().await;
        if state.fail_fetch {
            return Err(MessageError::operation_failed(
                "fetch_unsent",
                "store unavailable",
            ));
        }

        let mut unsent: Vec<&Message> = state
            .messages
            .iter()
            .filter(|m| !m.is_sent() && !m.is_deleted())
            .collect();
        unsent.sort_by_key(|m| m.created_at());

        Ok(unsent
            .into_iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_sent(&self, id: &MessageId) -> Result<(), MessageError> {
        let mut state = self.state.write().await;
        if state.fail_mark_sent {
            return Err(MessageError::operation_failed("mark_sent", "store unavailable"));
        }

        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id() == *id && !m.is_deleted())
            .ok_or_else(|| MessageError::not_found(*id))?;
        message.mark_sent(Timestamp::now());
        Ok(())
    }

    async fn create(&self, message: &Message) -> Result<(), MessageError> {
        self.state.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageError> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .iter()
            .find(|m| m.id() == *id && !m.is_deleted())
            .cloned())
    }
}

#[async_trait]
impl MessageReader for InMemoryMessageStore {
    async fn list_sent(&self, page: PageRequest) -> Result<SentMessagePage, MessageError> {
        let state = self.state.read().await;
        if state.fail_list_sent {
            return Err(MessageError::operation_failed("list_sent", "store unavailable"));
        }

        let mut sent: Vec<&Message> = state
            .messages
            .iter()
            .filter(|m| m.is_sent() && !m.is_deleted())
            .collect();
        sent.sort_by(|a, b| b.sent_at().cmp(&a.sent_at()));

        let total = sent.len() as u64;
        let items = sent
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect();

        Ok(SentMessagePage { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_at(to: &str, hours_ago: i64) -> Message {
        Message::new(to, "content")
            .unwrap()
            .with_created_at(Timestamp::now().minus_hours(hours_ago))
    }

    #[tokio::test]
    async fn fetch_unsent_returns_oldest_first_up_to_limit() {
        let newest = message_at("+901", 0);
        let oldest = message_at("+902", 3);
        let middle = message_at("+903", 1);
        let store =
            InMemoryMessageStore::with_messages(vec![newest, oldest.clone(), middle.clone()])
                .await;

        let batch = store.fetch_unsent(2).await.unwrap();

        assert_eq!(
            batch.iter().map(Message::id).collect::<Vec<_>>(),
            vec![oldest.id(), middle.id()]
        );
    }

    #[tokio::test]
    async fn fetch_unsent_on_empty_store_is_empty() {
        let store = InMemoryMessageStore::new();
        assert!(store.fetch_unsent(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sent_and_deleted_messages_are_not_fetched() {
        let sent = message_at("+901", 2);
        let deleted = message_at("+902", 1);
        let live = message_at("+903", 0);
        let store = InMemoryMessageStore::with_messages(vec![
            sent.clone(),
            deleted.clone(),
            live.clone(),
        ])
        .await;
        store.mark_sent(&sent.id()).await.unwrap();
        store.soft_delete(&deleted.id()).await.unwrap();

        let batch = store.fetch_unsent(10).await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].id(), live.id());
    }

    #[tokio::test]
    async fn mark_sent_unknown_id_is_not_found() {
        let store = InMemoryMessageStore::new();
        let id = MessageId::new();

        assert_eq!(
            store.mark_sent(&id).await,
            Err(MessageError::not_found(id))
        );
    }

    #[tokio::test]
    async fn mark_sent_twice_keeps_first_timestamp() {
        let message = message_at("+901", 0);
        let store = InMemoryMessageStore::with_messages(vec![message.clone()]).await;

        store.mark_sent(&message.id()).await.unwrap();
        let first = store.find_by_id(&message.id()).await.unwrap().unwrap();
        store.mark_sent(&message.id()).await.unwrap();
        let second = store.find_by_id(&message.id()).await.unwrap().unwrap();

        assert!(first.is_sent());
        assert_eq!(first.sent_at(), second.sent_at());
    }

    #[tokio::test]
    async fn deleted_message_cannot_be_marked_sent() {
        let message = message_at("+901", 0);
        let store = InMemoryMessageStore::with_messages(vec![message.clone()]).await;
        store.soft_delete(&message.id()).await.unwrap();

        assert!(matches!(
            store.mark_sent(&message.id()).await,
            Err(MessageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_sent_pages_by_most_recent_send() {
        let messages: Vec<Message> = (0..3).map(|i| message_at("+90", i)).collect();
        let store = InMemoryMessageStore::with_messages(messages.clone()).await;
        for message in &messages {
            store.mark_sent(&message.id()).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let first_page = store.list_sent(PageRequest::new(1, 2)).await.unwrap();
        let second_page = store.list_sent(PageRequest::new(2, 2)).await.unwrap();

        assert_eq!(first_page.total, 3);
        assert_eq!(first_page.items.len(), 2);
        assert_eq!(first_page.items[0].id(), messages[2].id());
        assert_eq!(second_page.items.len(), 1);
        assert_eq!(second_page.items[0].id(), messages[0].id());
    }

    #[tokio::test]
    async fn failure_switches_surface_operation_failed() {
        let message = message_at("+901", 0);
        let store = InMemoryMessageStore::with_messages(vec![message.clone()]).await;
        store.set_fail_fetch(true).await;
        store.set_fail_mark_sent(true).await;

        assert!(matches!(
            store.fetch_unsent(1).await,
            Err(MessageError::OperationFailed { operation: "fetch_unsent", .. })
        ));
        assert!(matches!(
            store.mark_sent(&message.id()).await,
            Err(MessageError::OperationFailed { operation: "mark_sent", .. })
        ));
    }
}
