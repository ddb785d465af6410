//! Per-tick draining of the message queue.

use std::sync::Arc;

use chrono::Utc;
use outpost_common::message::Message;
use outpost_store::{ApplicationStore, QueueStore};
use tracing::{debug, error, info, warn};

use crate::{DeliveryConfig, DeliveryError, Dispatcher, credentials};

/// Outcome counts for one worker tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Messages selected from the queue this tick.
    pub selected: usize,
    /// Promoted to `Sent`.
    pub sent: usize,
    /// Failed this attempt but left `Queued` for a future tick.
    pub deferred: usize,
    /// Failed terminally.
    pub failed: usize,
}

enum Outcome {
    Sent,
    Deferred,
    Failed,
}

/// The delivery worker: selects a bounded batch of due messages and
/// walks each through its state transition independently.
#[derive(Debug)]
pub struct DeliveryWorker {
    store: Arc<dyn QueueStore>,
    applications: Arc<dyn ApplicationStore>,
    dispatcher: Arc<dyn Dispatcher>,
    config: DeliveryConfig,
}

impl DeliveryWorker {
    #[must_use]
    pub fn new(
        store: Arc<dyn QueueStore>,
        applications: Arc<dyn ApplicationStore>,
        dispatcher: Arc<dyn Dispatcher>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            store,
            applications,
            dispatcher,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Run one delivery tick.
    ///
    /// A failure to select the batch aborts the whole tick with nothing
    /// mutated; the next scheduled tick retries naturally. Failures for
    /// individual messages are persisted on the message and never abort
    /// the remainder of the batch.
    ///
    /// # Errors
    /// `Selection` when the due-message batch cannot be read.
    pub async fn run_tick(&self) -> Result<TickSummary, DeliveryError> {
        let batch = self
            .store
            .select_batch(self.config.batch_limit, self.config.max_retries)
            .await?;

        if batch.is_empty() {
            debug!("No queued messages to process");
            return Ok(TickSummary::default());
        }

        info!(count = batch.len(), "Processing queued messages");

        let mut summary = TickSummary {
            selected: batch.len(),
            ..TickSummary::default()
        };

        for message in batch {
            match self.process(message).await {
                Outcome::Sent => summary.sent += 1,
                Outcome::Deferred => summary.deferred += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    /// Apply one message's state transition; the outcome is persisted
    /// before the caller moves to the next message.
    async fn process(&self, message: Message) -> Outcome {
        match self.attempt(&message).await {
            Ok(()) => {
                if let Err(e) = self.store.mark_sent(&message.id, Utc::now()).await {
                    error!(
                        message_id = %message.id,
                        error = %e,
                        "Failed to persist sent state"
                    );
                }
                info!(message_id = %message.id, "Message sent");
                Outcome::Sent
            }
            Err(e) => {
                let retry_count = message.retry_count + 1;
                let terminal = retry_count >= self.config.max_retries;

                if terminal {
                    error!(
                        message_id = %message.id,
                        retries = retry_count,
                        error = %e,
                        "Message permanently failed"
                    );
                } else {
                    warn!(
                        message_id = %message.id,
                        retry = retry_count,
                        max = self.config.max_retries,
                        error = %e,
                        "Message delivery failed"
                    );
                }

                if let Err(persist) = self
                    .store
                    .mark_failed_attempt(&message.id, retry_count, &e.to_string(), terminal)
                    .await
                {
                    error!(
                        message_id = %message.id,
                        error = %persist,
                        "Failed to persist failed attempt"
                    );
                }

                if terminal {
                    Outcome::Failed
                } else {
                    Outcome::Deferred
                }
            }
        }
    }

    /// One delivery attempt: tenant lookup, credential resolution,
    /// dispatch. Every failure mode comes back as a per-message error.
    async fn attempt(&self, message: &Message) -> Result<(), DeliveryError> {
        let application = self
            .applications
            .application(&message.application)
            .await
            .map_err(|e| DeliveryError::Send(format!("Application lookup failed: {e}")))?
            .ok_or_else(|| DeliveryError::MissingCredentials(message.application.clone()))?;

        let credentials = credentials::resolve(&application)?;

        self.dispatcher.send(message, &credentials).await
    }
}
