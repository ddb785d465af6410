use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outpost_common::message::{Message, MessageId, MessageStatus};

use crate::{StoreError, r#trait::QueueStore};

/// In-memory queue store.
///
/// Messages live in a `HashMap` behind an `RwLock`. An optional
/// capacity bound keeps accidental production use from growing without
/// limit; once reached, `create` fails until messages are removed by an
/// external administrative operation.
///
/// # Concurrency
/// Every state transition is a self-contained read-modify-write under
/// the write lock, keyed by message id, so concurrent transitions for
/// different messages cannot lose updates.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueStore {
    messages: Arc<RwLock<HashMap<MessageId, Message>>>,
    capacity: Option<usize>,
}

impl MemoryQueueStore {
    /// Create a new empty store with unlimited capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store holding at most `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Arc::new(RwLock::new(HashMap::new())),
            capacity: Some(capacity),
        }
    }

    /// Number of messages currently held, across all states.
    ///
    /// Recovers gracefully if the lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn create(&self, message: Message) -> crate::Result<MessageId> {
        let mut messages = self.messages.write()?;

        if let Some(capacity) = self.capacity
            && !messages.contains_key(&message.id)
            && messages.len() >= capacity
        {
            return Err(StoreError::CapacityExceeded {
                size: messages.len(),
                capacity,
            });
        }

        let id = message.id;
        messages.insert(id, message);
        Ok(id)
    }

    async fn get(&self, id: &MessageId) -> crate::Result<Message> {
        self.messages
            .read()?
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn select_batch(&self, limit: usize, max_retries: u32) -> crate::Result<Vec<Message>> {
        let mut due: Vec<Message> = self
            .messages
            .read()?
            .values()
            .filter(|message| message.is_due(max_retries))
            .cloned()
            .collect();

        // Urgent first, then oldest first; id as a stable tiebreaker.
        due.sort_by(|a, b| {
            b.urgent
                .cmp(&a.urgent)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        due.truncate(limit);

        Ok(due)
    }

    async fn mark_sent(&self, id: &MessageId, sent_at: DateTime<Utc>) -> crate::Result<()> {
        let mut messages = self.messages.write()?;
        let message = messages.get_mut(id).ok_or(StoreError::NotFound(*id))?;

        message.status = MessageStatus::Sent;
        message.sent_at = Some(sent_at);

        Ok(())
    }

    async fn mark_failed_attempt(
        &self,
        id: &MessageId,
        retry_count: u32,
        error: &str,
        terminal: bool,
    ) -> crate::Result<()> {
        let mut messages = self.messages.write()?;
        let message = messages.get_mut(id).ok_or(StoreError::NotFound(*id))?;

        message.retry_count = retry_count;
        message.error = Some(error.to_string());
        if terminal {
            message.status = MessageStatus::Failed;
        }

        Ok(())
    }
}
