// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail dispatch.
//!
//! Handlers depend on [`MailDispatcher`] only. Two implementations exist:
//! an SMTP transport built on lettre and a console dispatcher that writes
//! messages to the log for local development.
//!
//! An accepted submission produces two messages, sent by
//! [`NotificationSaga`] in order: owner notification, then submitter
//! confirmation. The pair is reported as one outcome but is not atomic;
//! if the second send fails the first message has already left.

use crate::config::MailConfig;
use crate::templates::{owner_notification, submitter_confirmation, MailContent};
use crate::validator::ValidatedSubmission;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

const MAILER_NAME: &str = "Portfolio Contact Form";
const PRIORITY_NORMAL: &str = "3";

/// Mail transport errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("Mail server rejected connection check")]
    VerificationFailed,

    #[error("Unsupported mail service {0:?}; set SMTP_HOST")]
    UnknownService(String),

    #[error("Missing mail setting: {0}")]
    MissingSetting(&'static str),
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn new(to: impl Into<String>, content: MailContent) -> Self {
        Self {
            to: to.into(),
            subject: content.subject,
            html: content.html,
        }
    }
}

/// Capability to deliver mail.
#[async_trait]
pub trait MailDispatcher: Send + Sync {
    /// Check that the transport is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), MailError>;

    /// Deliver one message.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (port 465)
    Implicit,
    /// Plain connection upgraded with STARTTLS
    StartTls,
}

/// Resolved SMTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
}

impl SmtpEndpoint {
    /// Resolve the server from the service selector, honouring explicit
    /// host and port overrides.
    pub fn resolve(config: &MailConfig) -> Result<Self, MailError> {
        let known = match config.service.as_str() {
            "gmail" => Some(("smtp.gmail.com", 465)),
            "outlook" | "hotmail" | "outlook365" => Some(("smtp-mail.outlook.com", 587)),
            "office365" => Some(("smtp.office365.com", 587)),
            "yahoo" => Some(("smtp.mail.yahoo.com", 465)),
            "zoho" => Some(("smtp.zoho.com", 465)),
            "icloud" => Some(("smtp.mail.me.com", 587)),
            _ => None,
        };

        let (host, default_port) = match (&config.smtp_host, known) {
            (Some(host), known) => (host.clone(), known.map(|(_, p)| p).unwrap_or(587)),
            (None, Some((host, port))) => (host.to_string(), port),
            (None, None) => return Err(MailError::UnknownService(config.service.clone())),
        };
        let port = config.smtp_port.unwrap_or(default_port);
        let tls = if port == 465 {
            TlsMode::Implicit
        } else {
            TlsMode::StartTls
        };

        Ok(Self { host, port, tls })
    }
}

/// SMTP dispatcher.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from configuration.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let user = config
            .user
            .clone()
            .ok_or(MailError::MissingSetting("EMAIL_USER"))?;
        let password = config
            .password
            .clone()
            .ok_or(MailError::MissingSetting("EMAIL_PASS"))?;
        let from = parse_mailbox(&user)?;
        let endpoint = SmtpEndpoint::resolve(config)?;

        let builder = match endpoint.tls {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&endpoint.host),
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&endpoint.host)
            }
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(endpoint.port)
            .credentials(Credentials::new(user, password))
            .build();

        info!(
            host = %endpoint.host,
            port = endpoint.port,
            tls = ?endpoint.tls,
            "SMTP transport configured"
        );

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl MailDispatcher for SmtpMailer {
    async fn verify(&self) -> Result<(), MailError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(MailError::VerificationFailed),
            Err(e) => Err(MailError::Transport(e.to_string())),
        }
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = build_message(self.from.clone(), mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        debug!(to = %mail.to, subject = %mail.subject, "Message delivered to relay");
        Ok(())
    }
}

/// Development dispatcher that logs messages instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl MailDispatcher for ConsoleMailer {
    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(
            to = %mail.to,
            subject = %mail.subject,
            body_bytes = mail.html.len(),
            "Mail (console dispatcher)"
        );
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn build_message(from: Mailbox, mail: &OutgoingMail) -> Result<Message, MailError> {
    Message::builder()
        .from(from)
        .to(parse_mailbox(&mail.to)?)
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_HTML)
        .raw_header(HeaderValue::new(
            HeaderName::new_from_ascii_str("X-Mailer"),
            MAILER_NAME.to_string(),
        ))
        .raw_header(HeaderValue::new(
            HeaderName::new_from_ascii_str("X-Priority"),
            PRIORITY_NORMAL.to_string(),
        ))
        .body(mail.html.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Steps of the notification saga, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStep {
    Verify,
    OwnerNotification,
    SubmitterConfirmation,
}

impl DispatchStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::OwnerNotification => "owner_notification",
            Self::SubmitterConfirmation => "submitter_confirmation",
        }
    }
}

impl fmt::Display for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one saga step. Steps before it have already taken effect.
#[derive(Debug, Error)]
#[error("Notification dispatch failed at {step}: {source}")]
pub struct DispatchError {
    pub step: DispatchStep,
    #[source]
    pub source: MailError,
}

/// Outcome of a fully dispatched submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub owner: String,
    pub submitter: String,
    pub elapsed_ms: u64,
}

/// Sends the owner notification and submitter confirmation as one unit.
#[derive(Clone)]
pub struct NotificationSaga {
    dispatcher: Arc<dyn MailDispatcher>,
    owner_address: String,
}

impl NotificationSaga {
    pub fn new(dispatcher: Arc<dyn MailDispatcher>, owner_address: impl Into<String>) -> Self {
        Self {
            dispatcher,
            owner_address: owner_address.into(),
        }
    }

    pub fn owner_address(&self) -> &str {
        &self.owner_address
    }

    /// Verify the transport, then send both messages sequentially. The
    /// first failing step aborts the rest.
    pub async fn run(
        &self,
        submission: &ValidatedSubmission,
        received_at: DateTime<Utc>,
    ) -> Result<DispatchReceipt, DispatchError> {
        let started = Instant::now();

        self.dispatcher
            .verify()
            .await
            .map_err(|source| DispatchError {
                step: DispatchStep::Verify,
                source,
            })?;

        let owner_mail = OutgoingMail::new(
            self.owner_address.clone(),
            owner_notification(submission, received_at),
        );
        self.dispatcher
            .send(&owner_mail)
            .await
            .map_err(|source| DispatchError {
                step: DispatchStep::OwnerNotification,
                source,
            })?;

        let confirmation = OutgoingMail::new(
            submission.email.clone(),
            submitter_confirmation(submission),
        );
        self.dispatcher
            .send(&confirmation)
            .await
            .map_err(|source| DispatchError {
                step: DispatchStep::SubmitterConfirmation,
                source,
            })?;

        Ok(DispatchReceipt {
            owner: owner_mail.to,
            submitter: confirmation.to,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
