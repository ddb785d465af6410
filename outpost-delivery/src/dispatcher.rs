//! Outbound SMTP dispatch.
//!
//! All vendor behavior sits behind the [`Dispatcher`] trait; the rest
//! of the engine only ever sees `Ok` or a [`DeliveryError::Send`] with
//! the underlying message text.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{Attachment as MailAttachment, Body, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use outpost_common::{
    message::{Attachment, Message},
    text::html_to_text,
};

use crate::{DeliveryError, SmtpCredentials};

/// Performs the actual send of one message with resolved credentials.
#[async_trait]
pub trait Dispatcher: Send + Sync + std::fmt::Debug {
    /// Deliver `message` through the tenant transport described by
    /// `credentials`.
    ///
    /// # Errors
    /// `Send` for any transport or protocol level failure; never panics
    /// and never lets a transport error escape as anything else.
    async fn send(
        &self,
        message: &Message,
        credentials: &SmtpCredentials,
    ) -> Result<(), DeliveryError>;
}

/// SMTP dispatcher backed by lettre's async transport.
///
/// A transport session is built per send from the resolved credentials:
/// implicit TLS when `secure` is set, opportunistic STARTTLS otherwise,
/// authenticated as the tenant's configured mailbox, with a bounded
/// timeout so one unreachable server cannot starve the batch.
#[derive(Debug, Clone)]
pub struct SmtpDispatcher {
    timeout: Duration,
}

impl SmtpDispatcher {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn transport(
        &self,
        credentials: &SmtpCredentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let tls_parameters = TlsParameters::new(credentials.host.clone()).map_err(send_error)?;
        let tls = if credentials.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::relay(&credentials.host)
                .map_err(send_error)?
                .port(credentials.port)
                .tls(tls)
                .credentials(Credentials::new(
                    credentials.username.clone(),
                    credentials.password.clone(),
                ))
                .timeout(Some(self.timeout))
                .build(),
        )
    }
}

fn send_error(e: impl std::fmt::Display) -> DeliveryError {
    DeliveryError::Send(e.to_string())
}

/// Decode an attachment's base64 content into raw bytes.
///
/// # Errors
/// `Send` when the content is not valid base64.
pub fn decode_content(attachment: &Attachment) -> Result<Vec<u8>, DeliveryError> {
    BASE64.decode(&attachment.content).map_err(|e| {
        DeliveryError::Send(format!(
            "Invalid base64 content in attachment {}: {e}",
            attachment.filename
        ))
    })
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, DeliveryError> {
    let content = Body::new(decode_content(attachment)?);
    let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
        DeliveryError::Send(format!(
            "Invalid MIME type {} on attachment {}: {e}",
            attachment.content_type, attachment.filename
        ))
    })?;

    // The record carries no separate content id, so inline parts reuse
    // the filename as their id.
    let part = if attachment.disposition.eq_ignore_ascii_case("inline") {
        MailAttachment::new_inline(attachment.filename.clone())
    } else {
        MailAttachment::new(attachment.filename.clone())
    };

    Ok(part.body(content, content_type))
}

/// Build the outgoing mail: display-name sender over the tenant's
/// authenticated mailbox, all recipients, plain-text fallback alongside
/// the raw HTML body, then any attachments.
fn build_email(
    message: &Message,
    credentials: &SmtpCredentials,
) -> Result<lettre::Message, DeliveryError> {
    let sender_address = credentials.username.parse().map_err(|e| {
        DeliveryError::Send(format!(
            "Tenant mailbox {} is not a valid address: {e}",
            credentials.username
        ))
    })?;

    let mut builder = lettre::Message::builder()
        .from(Mailbox::new(Some(message.from.clone()), sender_address))
        .subject(message.subject.clone());

    for recipient in &message.to {
        let address = recipient.as_str().parse().map_err(send_error)?;
        builder = builder.to(Mailbox::new(None, address));
    }

    let alternative =
        MultiPart::alternative_plain_html(html_to_text(&message.body), message.body.clone());

    let body = if message.attachments.is_empty() {
        alternative
    } else {
        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attachment in &message.attachments {
            mixed = mixed.singlepart(attachment_part(attachment)?);
        }
        mixed
    };

    builder.multipart(body).map_err(send_error)
}

#[async_trait]
impl Dispatcher for SmtpDispatcher {
    async fn send(
        &self,
        message: &Message,
        credentials: &SmtpCredentials,
    ) -> Result<(), DeliveryError> {
        let email = build_email(message, credentials)?;
        let transport = self.transport(credentials)?;

        transport.send(email).await.map_err(send_error)?;

        Ok(())
    }
}
