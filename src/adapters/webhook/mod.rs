//! Webhook delivery adapters.
//!
//! - `WebhookDelivery` - reqwest client posting to the provider
//! - `MockDelivery` - Scripted provider for tests

mod mock_delivery;
mod webhook_delivery;

pub use mock_delivery::MockDelivery;
pub use webhook_delivery::{
    WebhookDelivery, WebhookDeliveryConfig, WebhookSetupError, DEFAULT_AUTH_HEADER,
};
