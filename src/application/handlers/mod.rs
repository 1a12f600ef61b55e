//! Application handlers.
//!
//! Query handlers that read through the ports.

mod list_sent_messages;

pub use list_sent_messages::{
    ListSentMessagesHandler, ListSentMessagesQuery, PaginationLimits, SentMessageView,
    SentMessagesView,
};
