use std::future::Future;

use mailform_models::email_address::EmailAddressWithName;
use serde::Serialize;

/// Narrow interface to the outbound mail transport.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Whether a transport has been configured at all.
    fn is_configured(&self) -> bool;

    /// Verify that the transport is reachable and accepts our credentials.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Hand the email over to the transport.
    fn send(&self, email: Email) -> impl Future<Output = anyhow::Result<MessageId>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddressWithName,
    pub subject: String,
    /// Plain text body. Always sent, even if there is an html body.
    pub text: String,
    pub html: Option<String>,
    pub reply_to: Option<EmailAddressWithName>,
}

/// The `Message-ID` assigned to a sent email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_is_configured(mut self, result: bool) -> Self {
        self.expect_is_configured().once().return_const(result);
        self
    }

    pub fn with_ping(mut self, result: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(
                result
                    .then_some(())
                    .ok_or_else(|| anyhow::anyhow!("Failed to ping smtp server")),
            ))
        });
        self
    }

    pub fn with_send(mut self, email: Email, result: Option<MessageId>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| {
                Box::pin(std::future::ready(
                    result.ok_or_else(|| anyhow::anyhow!("Failed to send email")),
                ))
            });
        self
    }
}
