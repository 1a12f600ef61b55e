//! MessageReader port - Read-side queries for sent messages.

use async_trait::async_trait;

use crate::domain::message::{Message, MessageError};

/// One-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Number of rows to skip for this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// A page of sent messages plus the total count of sent messages.
#[derive(Debug, Clone)]
pub struct SentMessagePage {
    /// Messages on this page, most recently sent first.
    pub items: Vec<Message>,

    /// Total number of sent, non-deleted messages.
    pub total: u64,
}

/// Reader port for listing sent messages.
#[async_trait]
pub trait MessageReader: Send + Sync {
    /// Lists sent, non-deleted messages ordered by sent time descending.
    async fn list_sent(&self, page: PageRequest) -> Result<SentMessagePage, MessageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_has_zero_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
    }
}
