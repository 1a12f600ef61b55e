//! PostgreSQL adapters - Database implementations for the message ports.
//!
//! - `PostgresMessageRepository` - Batch fetch, mark-sent and creation
//! - `PostgresMessageReader` - Paginated sent-message listing
//! - `seed_sample_data` - Demo rows for an empty table

mod message_reader;
mod message_repository;
mod sample_data;

pub use message_reader::PostgresMessageReader;
pub use message_repository::PostgresMessageRepository;
pub use sample_data::{sample_messages, seed_sample_data};
