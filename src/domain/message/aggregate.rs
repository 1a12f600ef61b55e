//! Message aggregate.
//!
//! A message is created unsent, transitions to sent exactly once, and may be
//! soft-deleted outside the dispatch flow. The sent flag is derived from the
//! sent timestamp so the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

use super::values::{MessageContent, Recipient};

/// An outbound message awaiting (or past) webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    to: Recipient,
    content: MessageContent,
    sent_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
    deleted_at: Option<Timestamp>,
}

impl Message {
    /// Creates a new unsent message.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the destination is blank or the content
    /// exceeds the maximum length.
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Result<Self, ValidationError> {
        let to = Recipient::new(to)?;
        let content = MessageContent::new(content)?;
        let now = Timestamp::now();

        Ok(Self {
            id: MessageId::new(),
            to,
            content,
            sent_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// Reconstitute a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        to: Recipient,
        content: MessageContent,
        sent_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
        deleted_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            to,
            content,
            sent_at,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    /// Backdates the creation time, e.g. for seeded or imported messages.
    pub fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn to(&self) -> &Recipient {
        &self.to
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }

    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }

    pub fn sent_at(&self) -> Option<Timestamp> {
        self.sent_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Records the message as sent.
    ///
    /// Returns `false` and leaves the original sent time untouched when the
    /// message was already sent.
    pub fn mark_sent(&mut self, at: Timestamp) -> bool {
        if self.sent_at.is_some() {
            return false;
        }
        self.sent_at = Some(at);
        self.updated_at = at;
        true
    }

    /// Soft-deletes the message, hiding it from every store query.
    pub fn soft_delete(&mut self, at: Timestamp) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(at);
            self.updated_at = at;
        }
    }
}
