use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outpost_common::message::{Message, MessageId};

use crate::Result;

/// Contract the delivery worker holds over the durable message table.
///
/// State transitions are expressed as two fixed-field updates rather
/// than a generic partial update, so exactly what each transition
/// touches is part of the contract. Both are keyed by message id and
/// must be idempotent: under a benign double-send race the second
/// writer re-applies the same transition.
#[async_trait]
pub trait QueueStore: Send + Sync + std::fmt::Debug {
    /// Insert a newly intaken message.
    ///
    /// # Errors
    /// If the message cannot be persisted.
    async fn create(&self, message: Message) -> Result<MessageId>;

    /// Fetch one message by id.
    ///
    /// # Errors
    /// `NotFound` if no such message exists.
    async fn get(&self, id: &MessageId) -> Result<Message>;

    /// Select the due batch for one worker tick.
    ///
    /// Returns messages in `Queued` state with a retry count below
    /// `max_retries`, urgent ones first, then oldest-created first,
    /// truncated to at most `limit` entries.
    ///
    /// # Errors
    /// If the underlying store cannot be read.
    async fn select_batch(&self, limit: usize, max_retries: u32) -> Result<Vec<Message>>;

    /// Record a successful delivery: state `Sent` plus the timestamp.
    ///
    /// # Errors
    /// `NotFound` if the message disappeared between selection and write.
    async fn mark_sent(&self, id: &MessageId, sent_at: DateTime<Utc>) -> Result<()>;

    /// Record a failed attempt: the new retry count and the error text.
    /// `terminal` moves the message to `Failed`; otherwise it stays
    /// `Queued` for a future tick.
    ///
    /// # Errors
    /// `NotFound` if the message disappeared between selection and write.
    async fn mark_failed_attempt(
        &self,
        id: &MessageId,
        retry_count: u32,
        error: &str,
        terminal: bool,
    ) -> Result<()>;
}
