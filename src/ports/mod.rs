//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `MessageRepository` - Fetch unsent batches and mark messages sent
//! - `MessageReader` - Paginated listing of sent messages
//!
//! ## Outbound Ports
//!
//! - `MessageDelivery` - Webhook call that hands a message to the provider
//! - `MessageCache` - Best-effort record of provider-assigned identifiers

mod message_cache;
mod message_delivery;
mod message_reader;
mod message_repository;

pub use message_cache::{cache_key, CacheError, CachedDelivery, MessageCache};
pub use message_delivery::{DeliveryError, DeliveryReceipt, DeliveryRequest, MessageDelivery};
pub use message_reader::{MessageReader, PageRequest, SentMessagePage};
pub use message_repository::MessageRepository;
