use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{EmailAddress, InvalidAddress};

/// Identifier for a queued message.
///
/// A ULID: globally unique and lexicographically sortable by creation
/// time, which makes id ordering double as creation ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(ulid::Ulid);

impl MessageId {
    /// Generate a new unique message id.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Parse an id from its canonical string form.
    ///
    /// # Errors
    /// If the string is not a valid ULID.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        ulid::Ulid::from_string(s).map(Self)
    }

    /// Milliseconds since the Unix epoch encoded in this id.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for MessageId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for MessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a queued message.
///
/// `Queued` is the only state in which delivery attempts happen. `Sent`
/// and `Failed` are terminal; `Failed` is reached only once the retry
/// counter hits the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Queued,
    Sent,
    Failed,
}

impl MessageStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Sent | Self::Failed)
    }
}

/// A file attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// Declared MIME type, e.g. `application/pdf`.
    pub content_type: String,
    /// Base64-encoded file content.
    pub content: String,
    #[serde(default = "default_disposition")]
    pub disposition: String,
}

fn default_disposition() -> String {
    "attachment".to_string()
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),

    #[error("A message requires at least one recipient")]
    NoRecipients,
}

/// A queue entry: one message awaiting (or having finished) delivery.
///
/// Created by the intake boundary in `Queued` state and mutated only by
/// the delivery worker, which either promotes it to `Sent` or walks the
/// retry counter up until `Failed`. Never deleted by the delivery core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Owning tenant application id.
    pub application: String,
    /// Submitting user, when the intake boundary knows one.
    #[serde(default)]
    pub user: Option<String>,
    /// Sender display name. The envelope sender address is always the
    /// tenant's authenticated mailbox, resolved at dispatch time.
    pub from: String,
    pub to: Vec<EmailAddress>,
    pub subject: String,
    /// Rich (HTML) body. A plain-text fallback is derived at dispatch.
    pub body: String,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub status: MessageStatus,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a new message in `Queued` state with a fresh id.
    ///
    /// Recipient addresses are validated and normalized to lower case.
    ///
    /// # Errors
    /// If any recipient fails address validation, or none are given.
    pub fn queued(
        application: impl Into<String>,
        from: impl Into<String>,
        to: &[&str],
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<Self, MessageError> {
        if to.is_empty() {
            return Err(MessageError::NoRecipients);
        }

        let to = to
            .iter()
            .map(|addr| EmailAddress::parse(addr))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: MessageId::generate(),
            application: application.into(),
            user: None,
            from: from.into(),
            to,
            subject: subject.into(),
            body: body.into(),
            urgent: false,
            attachments: Vec::new(),
            status: MessageStatus::Queued,
            retry_count: 0,
            error: None,
            sent_at: None,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Whether this message is still eligible for a delivery attempt.
    #[must_use]
    pub const fn is_due(&self, max_retries: u32) -> bool {
        matches!(self.status, MessageStatus::Queued) && self.retry_count < max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_message_has_queue_defaults() {
        let msg = Message::queued("app-1", "Billing", &["User@Example.com"], "Hi", "<p>Hi</p>")
            .unwrap();

        assert_eq!(msg.status, MessageStatus::Queued);
        assert_eq!(msg.retry_count, 0);
        assert!(!msg.urgent);
        assert!(msg.error.is_none());
        assert!(msg.sent_at.is_none());
        assert!(msg.attachments.is_empty());
        assert_eq!(msg.to[0].as_str(), "user@example.com");
    }

    #[test]
    fn rejects_empty_recipient_list() {
        let result = Message::queued("app-1", "Billing", &[], "Hi", "body");
        assert!(matches!(result, Err(MessageError::NoRecipients)));
    }

    #[test]
    fn rejects_invalid_recipient() {
        let result = Message::queued("app-1", "Billing", &["not-an-address"], "Hi", "body");
        assert!(matches!(result, Err(MessageError::InvalidAddress(_))));
    }

    #[test]
    fn ids_sort_by_creation_time() {
        let first = MessageId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = MessageId::generate();
        assert!(first < second);
        assert!(first.timestamp_ms() <= second.timestamp_ms());
    }

    #[test]
    fn message_id_round_trips_through_string() {
        let id = MessageId::generate();
        let parsed = MessageId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn due_only_while_queued_under_budget() {
        let mut msg =
            Message::queued("app-1", "X", &["a@example.com"], "s", "b").unwrap();
        assert!(msg.is_due(3));

        msg.retry_count = 3;
        assert!(!msg.is_due(3));

        msg.retry_count = 1;
        msg.status = MessageStatus::Sent;
        assert!(!msg.is_due(3));
    }

    #[test]
    fn attachment_disposition_defaults() {
        let att: Attachment = serde_json::from_str(
            r#"{"filename": "a.txt", "content_type": "text/plain", "content": "aGk="}"#,
        )
        .unwrap();
        assert_eq!(att.disposition, "attachment");
    }
}
