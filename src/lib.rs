//! Message Dispatcher - Periodic webhook delivery of stored messages
//!
//! Unsent messages are read from PostgreSQL in small batches, posted to a
//! webhook, marked as sent and their provider ids cached in Redis. A small
//! HTTP API starts and stops the loop and lists what has been sent.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
