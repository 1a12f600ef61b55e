//! In-memory store adapter.

mod message_store;

pub use message_store::InMemoryMessageStore;
