use chrono::{DateTime, Utc};
use mailform_email_contracts::Email;
use mailform_models::{client::ClientContext, contact::ContactMessage};

/// Turns a validated submission into the emails that are sent for it.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactComposeService: Send + Sync + 'static {
    /// Render the notification for the operator and the auto-reply for the
    /// submitter from the same message.
    fn compose(
        &self,
        message: &ContactMessage,
        metadata: &SubmissionMetadata,
    ) -> anyhow::Result<ContactEmails>;

    /// Render a diagnostic email addressed to the operator.
    fn compose_test_email(&self, sent_at: DateTime<Utc>) -> anyhow::Result<Email>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMetadata {
    pub submitted_at: DateTime<Utc>,
    pub client: ClientContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmails {
    pub notification: Email,
    pub auto_reply: Email,
}

#[cfg(feature = "mock")]
impl MockContactComposeService {
    pub fn with_compose(
        mut self,
        message: ContactMessage,
        metadata: SubmissionMetadata,
        result: ContactEmails,
    ) -> Self {
        self.expect_compose()
            .once()
            .with(
                mockall::predicate::eq(message),
                mockall::predicate::eq(metadata),
            )
            .return_once(|_, _| Ok(result));
        self
    }

    pub fn with_compose_test_email(mut self, sent_at: DateTime<Utc>, result: Email) -> Self {
        self.expect_compose_test_email()
            .once()
            .with(mockall::predicate::eq(sent_at))
            .return_once(|_| Ok(result));
        self
    }
}
