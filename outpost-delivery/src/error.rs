//! Typed error handling for delivery operations.
//!
//! Per-message failures (`MissingCredentials`, `Send`) are captured as
//! data on the message record and count toward its retry budget; only
//! `Selection` propagates out of a worker tick.

use outpost_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The owning tenant has no SMTP configuration (or no tenant record
    /// was found at all). Follows the normal per-message failure path.
    #[error("SMTP configuration missing for application {0}")]
    MissingCredentials(String),

    /// Transport or protocol level failure from the dispatcher.
    #[error("Send failed: {0}")]
    Send(String),

    /// The due-message batch could not be read. Aborts the current tick
    /// without touching any message state; the next tick retries.
    #[error("Batch selection failed: {0}")]
    Selection(#[from] StoreError),
}

impl DeliveryError {
    /// Whether this error belongs to a single message's attempt, as
    /// opposed to the tick as a whole.
    #[must_use]
    pub const fn is_per_message(&self) -> bool {
        matches!(self, Self::MissingCredentials(_) | Self::Send(_))
    }
}
