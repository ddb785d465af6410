//! Shared fixtures for delivery integration tests.
#![allow(dead_code)]

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outpost_common::{
    application::{Application, SmtpConfig},
    message::{Message, MessageId},
};
use outpost_delivery::{DeliveryError, Dispatcher, SmtpCredentials};
use outpost_store::{MemoryQueueStore, QueueStore, StoreError};

/// Dispatcher double that records sends instead of opening connections.
#[derive(Debug, Default)]
pub struct MockDispatcher {
    delay: Option<Duration>,
    fail_all: Option<String>,
    fail_subject_marker: Option<String>,
    sends: Mutex<Vec<MessageId>>,
}

impl MockDispatcher {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            fail_all: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Fail only messages whose subject contains `marker`.
    pub fn failing_subjects(marker: &str, error: &str) -> Self {
        Self {
            fail_all: Some(error.to_string()),
            fail_subject_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Successful sends, in dispatch order.
    pub fn sends(&self) -> Vec<MessageId> {
        self.sends.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn send(
        &self,
        message: &Message,
        _credentials: &SmtpCredentials,
    ) -> Result<(), DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.fail_all {
            let applies = self
                .fail_subject_marker
                .as_ref()
                .is_none_or(|marker| message.subject.contains(marker));
            if applies {
                return Err(DeliveryError::Send(error.clone()));
            }
        }

        self.sends.lock().unwrap().push(message.id);
        Ok(())
    }
}

/// Queue store wrapper that can be switched to fail batch selection,
/// while counting every state mutation that reaches the inner store.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryQueueStore,
    fail_select: AtomicBool,
    mutations: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_selects(&self, fail: bool) {
        self.fail_select.store(fail, Ordering::SeqCst);
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueueStore for FlakyStore {
    async fn create(&self, message: Message) -> Result<MessageId, StoreError> {
        self.inner.create(message).await
    }

    async fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.inner.get(id).await
    }

    async fn select_batch(&self, limit: usize, max_retries: u32) -> Result<Vec<Message>, StoreError> {
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection reset".to_string()));
        }
        self.inner.select_batch(limit, max_retries).await
    }

    async fn mark_sent(&self, id: &MessageId, sent_at: DateTime<Utc>) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_sent(id, sent_at).await
    }

    async fn mark_failed_attempt(
        &self,
        id: &MessageId,
        retry_count: u32,
        error: &str,
        terminal: bool,
    ) -> Result<(), StoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner
            .mark_failed_attempt(id, retry_count, error, terminal)
            .await
    }
}

pub fn tenant(id: &str) -> Application {
    Application {
        id: id.to_string(),
        name: format!("{id}-app"),
        enabled: true,
        smtp: Some(SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            secure: false,
            username: "mailer@example.com".to_string(),
            password: "hunter2".to_string(),
        }),
    }
}

pub fn tenant_without_smtp(id: &str) -> Application {
    Application {
        id: id.to_string(),
        name: format!("{id}-app"),
        enabled: true,
        smtp: None,
    }
}

pub fn queued_message(application: &str, subject: &str, urgent: bool) -> Message {
    Message::queued(
        application,
        "Outpost Tests",
        &["rcpt@example.com"],
        subject,
        "<p>Hello</p>",
    )
    .unwrap()
    .with_urgent(urgent)
}
