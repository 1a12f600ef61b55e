//! Delivery cache adapters.
//!
//! - `RedisMessageCache` - Production cache with Redis-side expiry
//! - `InMemoryMessageCache` - For tests and single-process runs

mod in_memory;
mod redis;

pub use in_memory::InMemoryMessageCache;
pub use redis::RedisMessageCache;
