//! Application layer - Dispatch loop and query handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

mod dispatcher;
pub mod handlers;

pub use dispatcher::{BatchReport, DeliveryOutcome, MessageDispatcher, MessageDispatcherConfig};
pub use handlers::{
    ListSentMessagesHandler, ListSentMessagesQuery, PaginationLimits, SentMessageView,
    SentMessagesView,
};
