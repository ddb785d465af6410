//! Error types for store operations.

use outpost_common::message::MessageId;
use thiserror::Error;

/// Failures surfaced by the queue and application stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No message with the given id exists.
    #[error("Message not found: {0}")]
    NotFound(MessageId),

    /// The store rejected a write because it is at capacity.
    #[error("Store capacity exceeded: {size}/{capacity} messages")]
    CapacityExceeded { size: usize, capacity: usize },

    /// Backend-specific failure (connection loss, lock poisoning, ...).
    #[error("Store error: {0}")]
    Backend(String),
}

/// Specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        Self::Backend(format!("Lock poisoned: {e}"))
    }
}
