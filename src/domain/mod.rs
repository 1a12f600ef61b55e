//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `message` - Outbound message aggregate and its value objects

pub mod foundation;
pub mod message;
