use std::future::Future;

use chrono::{DateTime, Utc};
use mailform_email_contracts::MessageId;
use mailform_models::{
    client::ClientContext,
    contact::{RawSubmission, ValidationErrors},
    email_address::EmailAddressWithName,
};
use thiserror::Error;

pub mod compose;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + Sync + 'static {
    /// Accept a contact form submission and dispatch the notification and
    /// the auto-reply.
    ///
    /// The auto-reply is only attempted after the notification was sent.
    /// A failed auto-reply does not undo the notification.
    fn submit(
        &self,
        submission: RawSubmission,
        client: ClientContext,
    ) -> impl Future<Output = Result<ContactReceipt, ContactSubmitError>> + Send;

    /// Send a diagnostic email to the contact recipient.
    fn send_test_email(
        &self,
        client: ClientContext,
    ) -> impl Future<Output = Result<TestEmailReceipt, ContactTestEmailError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactReceipt {
    pub submitted_at: DateTime<Utc>,
    pub notification_id: MessageId,
    pub auto_reply_id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEmailReceipt {
    pub sent_at: DateTime<Utc>,
    pub recipient: EmailAddressWithName,
    pub message_id: MessageId,
}

#[derive(Debug, Error)]
pub enum ContactSubmitError {
    #[error("Too many requests, retry after {reset_at}.")]
    RateLimited { reset_at: DateTime<Utc> },
    #[error("Validation failed: {0}")]
    ValidationFailed(ValidationErrors),
    #[error("No email transport configured.")]
    ConfigurationMissing,
    #[error("Email transport unavailable.")]
    TransportUnavailable,
    #[error("Failed to send {0} email.")]
    SendFailed(SendStage),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ContactTestEmailError {
    #[error("Too many requests, retry after {reset_at}.")]
    RateLimited { reset_at: DateTime<Utc> },
    #[error("No email transport configured.")]
    ConfigurationMissing,
    #[error("Email transport unavailable.")]
    TransportUnavailable,
    #[error("Failed to send test email.")]
    SendFailed,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which of the emails of a submission could not be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Notification,
    AutoReply,
}

impl SendStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::AutoReply => "auto-reply",
        }
    }
}

impl std::fmt::Display for SendStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "mock")]
impl MockContactFeatureService {
    pub fn with_submit(
        mut self,
        submission: RawSubmission,
        client: ClientContext,
        result: Result<ContactReceipt, ContactSubmitError>,
    ) -> Self {
        self.expect_submit()
            .once()
            .with(
                mockall::predicate::eq(submission),
                mockall::predicate::eq(client),
            )
            .return_once(|_, _| Box::pin(std::future::ready(result)));
        self
    }

    pub fn with_send_test_email(
        mut self,
        client: ClientContext,
        result: Result<TestEmailReceipt, ContactTestEmailError>,
    ) -> Self {
        self.expect_send_test_email()
            .once()
            .with(mockall::predicate::eq(client))
            .return_once(|_| Box::pin(std::future::ready(result)));
        self
    }
}
