//! MessageRepository port - Write-side access to message records.
//!
//! The dispatcher depends on exactly two operations: fetching a bounded,
//! oldest-first batch of unsent messages and marking one message as sent.
//! `create` and `find_by_id` serve seeding and verification.

use async_trait::async_trait;

use crate::domain::foundation::MessageId;
use crate::domain::message::{Message, MessageError};

/// Repository port for message persistence.
///
/// Implementations must exclude soft-deleted records from every operation.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Returns at most `limit` unsent, non-deleted messages, oldest first.
    ///
    /// An empty result is not an error.
    async fn fetch_unsent(&self, limit: u32) -> Result<Vec<Message>, MessageError>;

    /// Atomically marks a message as sent, stamping the sent time.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the id does not resolve to a live record
    /// - `OperationFailed` on store I/O errors
    async fn mark_sent(&self, id: &MessageId) -> Result<(), MessageError>;

    /// Persists a new message.
    async fn create(&self, message: &Message) -> Result<(), MessageError>;

    /// Finds a live message by id.
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, MessageError>;
}
