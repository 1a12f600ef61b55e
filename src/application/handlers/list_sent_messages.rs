//! ListSentMessagesHandler - Query handler for the sent-message listing.
//!
//! Pages through sent messages and decorates each with whatever the delivery
//! cache still remembers about it.

use std::sync::Arc;

use serde::Serialize;

use crate::config::PaginationConfig;
use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::message::{Message, MessageError};
use crate::ports::{MessageCache, MessageReader, PageRequest};

/// Query for one page of sent messages. Missing values fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct ListSentMessagesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListSentMessagesQuery {
    pub fn paginated(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }
}

/// Page size limits applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationLimits {
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// Normalizes a query into a concrete page request.
    ///
    /// Pages below 1 become 1; sizes below 1 become the default; sizes above
    /// the maximum are clamped to it.
    pub fn resolve(&self, query: &ListSentMessagesQuery) -> PageRequest {
        let page = match query.page {
            Some(page) if page >= 1 => u32::try_from(page).unwrap_or(u32::MAX),
            _ => 1,
        };
        let page_size = match query.page_size {
            Some(size) if size >= 1 => {
                u32::try_from(size).unwrap_or(u32::MAX).min(self.max_page_size)
            }
            _ => self.default_page_size,
        };
        PageRequest::new(page, page_size)
    }
}

/// A sent message plus its cache entry, if one is still live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessageView {
    pub id: MessageId,
    pub to: String,
    pub content: String,
    pub is_sent: bool,
    pub sent_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_sent_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_message_id: Option<String>,
}

impl SentMessageView {
    fn from_message(message: &Message) -> Self {
        Self {
            id: message.id(),
            to: message.to().as_str().to_string(),
            content: message.content().as_str().to_string(),
            is_sent: message.is_sent(),
            sent_at: message.sent_at(),
            created_at: message.created_at(),
            updated_at: message.updated_at(),
            cached_sent_at: None,
            cached_message_id: None,
        }
    }
}

/// One page of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessagesView {
    pub messages: Vec<SentMessageView>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Handler for listing sent messages.
pub struct ListSentMessagesHandler {
    reader: Arc<dyn MessageReader>,
    cache: Arc<dyn MessageCache>,
    limits: PaginationLimits,
}

impl ListSentMessagesHandler {
    pub fn new(
        reader: Arc<dyn MessageReader>,
        cache: Arc<dyn MessageCache>,
        limits: PaginationLimits,
    ) -> Self {
        Self {
            reader,
            cache,
            limits,
        }
    }

    pub async fn handle(
        &self,
        query: ListSentMessagesQuery,
    ) -> Result<SentMessagesView, MessageError> {
        let request = self.limits.resolve(&query);
        let page = self.reader.list_sent(request).await?;

        let mut messages = Vec::with_capacity(page.items.len());
        for message in &page.items {
            let mut view = SentMessageView::from_message(message);
            match self.cache.get(&view.id).await {
                Ok(Some(entry)) => {
                    view.cached_sent_at = Some(entry.sent_at);
                    view.cached_message_id = Some(entry.provider_message_id);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(message_id = %view.id, error = %e, "Cache lookup failed");
                }
            }
            messages.push(view);
        }

        Ok(SentMessagesView {
            messages,
            page: request.page,
            page_size: request.page_size,
            total: page.total,
        })
    }
}
