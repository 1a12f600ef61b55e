//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MESSAGE_DISPATCHER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use message_dispatcher::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Webhook target: {}", config.webhook.url);
//! ```

mod database;
mod dispatcher;
mod error;
mod pagination;
mod redis;
mod server;
mod webhook;

pub use database::DatabaseConfig;
pub use dispatcher::DispatcherConfig;
pub use error::{ConfigError, ValidationError};
pub use pagination::PaginationConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use webhook::WebhookConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (delivery cache)
    pub redis: RedisConfig,

    /// Webhook endpoint and credentials
    pub webhook: WebhookConfig,

    /// Dispatch loop timing
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Sent-message listing limits
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MESSAGE_DISPATCHER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MESSAGE_DISPATCHER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `MESSAGE_DISPATCHER__WEBHOOK__URL=...` -> `webhook.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MESSAGE_DISPATCHER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.webhook.validate()?;
        self.dispatcher.validate()?;
        self.pagination.validate()?;

        // `POST /stop` waits for the in-flight tick, which may take a full batch.
        if self.server.request_timeout_secs <= self.dispatcher.batch_timeout_secs {
            return Err(ValidationError::RequestTimeoutTooShort);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
