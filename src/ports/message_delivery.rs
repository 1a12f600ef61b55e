//! MessageDelivery port - Outbound call that hands a message to the provider.
//!
//! The provider accepts a `{to, content}` payload and answers with its own
//! message identifier. Any outcome other than an accepted, well-formed
//! response is a [`DeliveryError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::message::Message;

/// Payload posted to the delivery provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRequest {
    pub to: String,
    pub content: String,
}

impl DeliveryRequest {
    pub fn new(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            content: content.into(),
        }
    }

    /// Builds the payload for a stored message.
    pub fn for_message(message: &Message) -> Self {
        Self::new(message.to().as_str(), message.content().as_str())
    }
}

/// Successful delivery acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Identifier assigned by the provider.
    pub provider_message_id: String,

    /// Human-readable status returned by the provider.
    pub status_message: String,
}

/// Delivery failure kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The deadline elapsed before the provider answered.
    #[error("delivery timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The provider could not be reached or the connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with a status other than accepted.
    #[error("unexpected status code: {status}")]
    UnexpectedStatus { status: u16 },

    /// The accepted response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl DeliveryError {
    pub fn timeout(timeout: Duration) -> Self {
        DeliveryError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        DeliveryError::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        DeliveryError::Decode(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Timeout { .. })
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DeliveryError::Timeout { .. } => "timeout",
            DeliveryError::Transport(_) => "transport",
            DeliveryError::UnexpectedStatus { .. } => "unexpected_status",
            DeliveryError::Decode(_) => "decode",
        }
    }
}

/// Port for delivering a message to the remote provider.
#[async_trait]
pub trait MessageDelivery: Send + Sync {
    /// Posts the payload and returns the provider receipt.
    ///
    /// Implementations must give up once `timeout` has elapsed and report
    /// that as [`DeliveryError::Timeout`].
    async fn deliver(
        &self,
        request: &DeliveryRequest,
        timeout: Duration,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
