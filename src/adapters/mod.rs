//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Message store on PostgreSQL (sqlx)
//! - `memory` - In-memory message store for tests and local runs
//! - `cache` - Delivery cache (Redis, in-memory)
//! - `webhook` - Webhook delivery (reqwest, mock)
//! - `http` - REST API (axum)

pub mod cache;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod webhook;

pub use cache::{InMemoryMessageCache, RedisMessageCache};
pub use memory::InMemoryMessageStore;
pub use postgres::{PostgresMessageReader, PostgresMessageRepository};
pub use webhook::{MockDelivery, WebhookDelivery, WebhookDeliveryConfig};
