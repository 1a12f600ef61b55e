//! MessageDispatcher - Periodic delivery of unsent messages to the webhook.
//!
//! Every tick the dispatcher fetches a small, oldest-first batch of unsent
//! messages and, one at a time:
//! 1. posts the message to the delivery port
//! 2. marks it sent in the store
//! 3. records the provider id in the cache (best effort)
//!
//! A failure on one message never affects the others in the batch. Messages
//! that fail stay unsent and are picked up again on a later tick.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 2min | Time between ticks; the first tick fires one interval after start |
//! | `batch_size` | 2 | Max messages fetched per tick |
//! | `batch_timeout` | 10s | Deadline for a whole tick |
//! | `message_timeout` | 5s | Deadline for one webhook call, clamped to the batch deadline |
//!
//! ## Lifecycle
//!
//! `start` spawns the loop on its own task; `stop` cancels it and waits for
//! the in-flight tick to finish. Both are serialized so at most one loop is
//! ever running per dispatcher.
//!
//! ## Known limitation
//!
//! If the webhook accepts a message but marking it sent fails, the message is
//! still unsent in the store and will be delivered again on a later tick.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, timeout_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::DispatcherConfig;
use crate::domain::foundation::{MessageId, Timestamp};
use crate::domain::message::{Message, MessageError};
use crate::ports::{
    CachedDelivery, DeliveryError, DeliveryRequest, MessageCache, MessageDelivery,
    MessageRepository,
};

/// Runtime settings for the dispatcher.
#[derive(Debug, Clone)]
pub struct MessageDispatcherConfig {
    /// Time between ticks.
    pub interval: Duration,

    /// Maximum messages fetched per tick.
    pub batch_size: u32,

    /// Deadline for a whole tick.
    pub batch_timeout: Duration,

    /// Deadline for a single webhook call.
    pub message_timeout: Duration,
}

impl Default for MessageDispatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(120),
            batch_size: 2,
            batch_timeout: Duration::from_secs(10),
            message_timeout: Duration::from_secs(5),
        }
    }
}

impl MessageDispatcherConfig {
    /// Builds runtime settings from the `dispatcher` config section.
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            interval: config.interval(),
            batch_size: config.batch_size,
            batch_timeout: config.batch_timeout(),
            message_timeout: config.message_timeout(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    pub fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Batch outcomes
// ════════════════════════════════════════════════════════════════════════════

/// What happened to one message during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Delivered and recorded as sent.
    Delivered { provider_message_id: String },

    /// Delivered, but the sent mark could not be stored. The message will be
    /// delivered again on a later tick.
    DeliveredUnrecorded {
        provider_message_id: String,
        error: MessageError,
    },

    /// The webhook call failed; the message stays unsent.
    Failed { reason: DeliveryError },

    /// The batch deadline passed before the message was attempted.
    Skipped,
}

/// Per-tick summary returned by [`MessageDispatcher::run_once`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<(MessageId, DeliveryOutcome)>,
}

impl BatchReport {
    fn record(&mut self, id: MessageId, outcome: DeliveryOutcome) {
        self.outcomes.push((id, outcome));
    }

    /// Outcomes in fetch order.
    pub fn outcomes(&self) -> &[(MessageId, DeliveryOutcome)] {
        &self.outcomes
    }

    pub fn outcome_for(&self, id: &MessageId) -> Option<&DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, outcome)| outcome)
    }

    /// Number of messages fetched for the tick.
    pub fn fetched(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Delivered { .. }))
    }

    pub fn unrecorded(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::DeliveredUnrecorded { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DeliveryOutcome::Skipped))
    }

    fn count(&self, predicate: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Worker
// ════════════════════════════════════════════════════════════════════════════

/// Collaborators shared between the dispatcher handle and its loop task.
struct DispatchWorker {
    repository: Arc<dyn MessageRepository>,
    delivery: Arc<dyn MessageDelivery>,
    cache: Arc<dyn MessageCache>,
    config: MessageDispatcherConfig,
}

impl DispatchWorker {
    async fn run_loop(&self, cancel: CancellationToken) {
        let period = self.config.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = period.as_secs(),
            batch_size = self.config.batch_size,
            "Message dispatcher loop started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(report) => log_report(&report),
                        Err(e) => tracing::error!(error = %e, "Failed to send messages"),
                    }
                }
            }
        }

        tracing::info!("Message dispatcher loop stopped");
    }

    async fn run_once(&self) -> Result<BatchReport, MessageError> {
        let batch_deadline = Instant::now() + self.config.batch_timeout;

        let messages = timeout_at(
            batch_deadline,
            self.repository.fetch_unsent(self.config.batch_size),
        )
        .await
        .map_err(|_| MessageError::operation_failed("fetch_unsent", "batch deadline exceeded"))??;

        let mut report = BatchReport::default();
        for message in messages {
            let id = message.id();
            if Instant::now() >= batch_deadline {
                tracing::warn!(message_id = %id, "Batch deadline reached, deferring message");
                report.record(id, DeliveryOutcome::Skipped);
                continue;
            }

            let outcome = self.dispatch(&message, batch_deadline).await;
            report.record(id, outcome);
        }

        Ok(report)
    }

    async fn dispatch(&self, message: &Message, batch_deadline: Instant) -> DeliveryOutcome {
        let id = message.id();
        let message_deadline = (Instant::now() + self.config.message_timeout).min(batch_deadline);
        let budget = message_deadline.saturating_duration_since(Instant::now());
        let request = DeliveryRequest::for_message(message);

        let delivered = timeout_at(message_deadline, self.delivery.deliver(&request, budget))
            .await
            .unwrap_or_else(|_| Err(DeliveryError::timeout(budget)));

        let receipt = match delivered {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(
                    message_id = %id,
                    kind = e.kind(),
                    error = %e,
                    "Failed to send message"
                );
                return DeliveryOutcome::Failed { reason: e };
            }
        };

        let marked = timeout_at(batch_deadline, self.repository.mark_sent(&id))
            .await
            .unwrap_or_else(|_| {
                Err(MessageError::operation_failed(
                    "mark_sent",
                    "batch deadline exceeded",
                ))
            });

        let entry = CachedDelivery::new(Timestamp::now(), receipt.provider_message_id.clone());
        self.cache_receipt(&id, &entry, batch_deadline).await;

        match marked {
            Ok(()) => {
                tracing::debug!(
                    message_id = %id,
                    provider_message_id = %receipt.provider_message_id,
                    "Message sent"
                );
                DeliveryOutcome::Delivered {
                    provider_message_id: receipt.provider_message_id,
                }
            }
            Err(e) => {
                tracing::error!(
                    message_id = %id,
                    provider_message_id = %receipt.provider_message_id,
                    error = %e,
                    "Failed to mark message as sent; it will be delivered again"
                );
                DeliveryOutcome::DeliveredUnrecorded {
                    provider_message_id: receipt.provider_message_id,
                    error: e,
                }
            }
        }
    }

    async fn cache_receipt(&self, id: &MessageId, entry: &CachedDelivery, deadline: Instant) {
        match timeout_at(deadline, self.cache.put(id, entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(message_id = %id, error = %e, "Failed to cache message ID");
            }
            Err(_) => {
                tracing::warn!(message_id = %id, "Caching message ID exceeded batch deadline");
            }
        }
    }
}

fn log_report(report: &BatchReport) {
    if report.is_empty() {
        tracing::debug!("No unsent messages");
        return;
    }
    tracing::info!(
        fetched = report.fetched(),
        delivered = report.delivered(),
        unrecorded = report.unrecorded(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Dispatch tick complete"
    );
}

// ════════════════════════════════════════════════════════════════════════════
// Dispatcher handle
// ════════════════════════════════════════════════════════════════════════════

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Message dispatcher loop terminated abnormally");
    }
}

struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the dispatch loop and its start/stop lifecycle.
pub struct MessageDispatcher {
    worker: Arc<DispatchWorker>,
    lifecycle: tokio::sync::Mutex<Option<RunningLoop>>,
    running: Mutex<bool>,
}

impl MessageDispatcher {
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        delivery: Arc<dyn MessageDelivery>,
        cache: Arc<dyn MessageCache>,
        config: MessageDispatcherConfig,
    ) -> Self {
        Self {
            worker: Arc::new(DispatchWorker {
                repository,
                delivery,
                cache,
                config,
            }),
            lifecycle: tokio::sync::Mutex::new(None),
            running: Mutex::new(false),
        }
    }

    pub fn config(&self) -> &MessageDispatcherConfig {
        &self.worker.config
    }

    /// Starts the periodic loop.
    ///
    /// Returns `false` without doing anything when the loop is already running.
    /// A loop left draining by an abandoned `stop` is awaited before the new
    /// one is spawned.
    pub async fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(previous) = lifecycle.as_mut() {
            if !previous.cancel.is_cancelled() {
                return false;
            }
            let joined = (&mut previous.handle).await;
            *lifecycle = None;
            log_join(joined);
        }

        self.set_running(true);

        let cancel = CancellationToken::new();
        let worker = Arc::clone(&self.worker);
        let token = cancel.clone();
        let handle = tokio::spawn(async move { worker.run_loop(token).await });

        *lifecycle = Some(RunningLoop { cancel, handle });
        true
    }

    /// Stops the loop and waits for the in-flight tick to finish.
    ///
    /// Returns `false` when the loop was not running. The loop stays in the
    /// lifecycle slot until it has exited, so dropping this future part way
    /// never lets a second loop start alongside the draining one.
    pub async fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(running) = lifecycle.as_mut() else {
            return false;
        };

        let was_running = !running.cancel.is_cancelled();
        self.set_running(false);
        running.cancel.cancel();

        let joined = (&mut running.handle).await;
        *lifecycle = None;
        log_join(joined);
        was_running
    }

    pub fn is_running(&self) -> bool {
        *self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs a single tick immediately, outside the periodic schedule.
    ///
    /// # Errors
    ///
    /// Only a failure to fetch the batch is returned; per-message failures
    /// are reported in the [`BatchReport`].
    pub async fn run_once(&self) -> Result<BatchReport, MessageError> {
        self.worker.run_once().await
    }

    fn set_running(&self, value: bool) {
        *self.running.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

impl Drop for MessageDispatcher {
    fn drop(&mut self) {
        if let Some(running) = self.lifecycle.get_mut().as_ref() {
            running.cancel.cancel();
        }
    }
}
