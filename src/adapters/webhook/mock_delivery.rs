//! Mock delivery for tests.
//!
//! Scripted outcomes are consumed in order; once the script runs out every
//! call succeeds with a fresh provider id. A configurable delay simulates a
//! slow provider and turns into `DeliveryError::Timeout` when it exceeds the
//! caller's deadline.
//!
//! # Example
//!
//! ```ignore
//! let delivery = MockDelivery::new()
//!     .with_failure(DeliveryError::UnexpectedStatus { status: 500 })
//!     .with_success("provider-2");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

use crate::ports::{DeliveryError, DeliveryReceipt, DeliveryRequest, MessageDelivery};

/// Mock delivery provider.
#[derive(Debug, Clone, Default)]
pub struct MockDelivery {
    script: Arc<Mutex<VecDeque<Result<String, DeliveryError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<DeliveryRequest>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a success carrying the given provider id.
    pub fn with_success(self, provider_message_id: impl Into<String>) -> Self {
        locked(&self.script).push_back(Ok(provider_message_id.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, error: DeliveryError) -> Self {
        locked(&self.script).push_back(Err(error));
        self
    }

    /// Delays every call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests received so far, in call order.
    pub fn calls(&self) -> Vec<DeliveryRequest> {
        locked(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }
}

#[async_trait]
impl MessageDelivery for MockDelivery {
    async fn deliver(
        &self,
        request: &DeliveryRequest,
        timeout: Duration,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        locked(&self.calls).push(request.clone());

        if !self.delay.is_zero() {
            if self.delay > timeout {
                sleep(timeout).await;
                return Err(DeliveryError::timeout(timeout));
            }
            sleep(self.delay).await;
        }

        let outcome = locked(&self.script)
            .pop_front()
            .unwrap_or_else(|| Ok(Uuid::new_v4().to_string()));

        outcome.map(|provider_message_id| DeliveryReceipt {
            provider_message_id,
            status_message: "Accepted".to_string(),
        })
    }
}
