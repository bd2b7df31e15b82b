use std::{future::Future, time::Duration};

use mailform_core_contact_contracts::{
    compose::{ContactComposeService, SubmissionMetadata},
    ContactFeatureService, ContactReceipt, ContactSubmitError, ContactTestEmailError,
    SendStage, TestEmailReceipt,
};
use mailform_email_contracts::{Email, EmailService, MessageId};
use mailform_models::{
    client::ClientContext,
    contact::{ContactMessage, RawSubmission},
};
use mailform_shared_contracts::{
    rate_limit::{RateLimitDecision, RateLimitService},
    time::TimeService,
};
use tracing::{debug, error, info, warn};

pub mod compose;

#[derive(Debug, Clone)]
pub struct ContactFeatureServiceImpl<Time, RateLimit, Email, Compose> {
    time: Time,
    rate_limit: RateLimit,
    email: Email,
    compose: Compose,
    config: ContactFeatureConfig,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Upper bound for the transport check and for each single send.
    pub transport_timeout: Duration,
}

impl<Time, RateLimit, Email, Compose> ContactFeatureServiceImpl<Time, RateLimit, Email, Compose> {
    pub fn new(
        time: Time,
        rate_limit: RateLimit,
        email: Email,
        compose: Compose,
        config: ContactFeatureConfig,
    ) -> Self {
        Self {
            time,
            rate_limit,
            email,
            compose,
            config,
        }
    }
}

impl<Time, RateLimit, EmailS, Compose> ContactFeatureService
    for ContactFeatureServiceImpl<Time, RateLimit, EmailS, Compose>
where
    Time: TimeService,
    RateLimit: RateLimitService,
    EmailS: EmailService,
    Compose: ContactComposeService,
{
    #[tracing::instrument(skip_all, fields(client_ip = %client.ip))]
    async fn submit(
        &self,
        submission: RawSubmission,
        client: ClientContext,
    ) -> Result<ContactReceipt, ContactSubmitError> {
        let now = self.time.now();

        if let RateLimitDecision::Rejected { reset_at } =
            self.rate_limit.admit(client.ip, now).await
        {
            return Err(ContactSubmitError::RateLimited { reset_at });
        }

        let message = ContactMessage::validate(submission).map_err(|errors| {
            debug!(%errors, "rejecting invalid submission");
            ContactSubmitError::ValidationFailed(errors)
        })?;

        if !self.email.is_configured() {
            error!("cannot dispatch contact message without an email transport");
            return Err(ContactSubmitError::ConfigurationMissing);
        }

        let emails = self.compose.compose(
            &message,
            &SubmissionMetadata {
                submitted_at: now,
                client,
            },
        )?;

        self.verify_transport().await?;

        let notification_id = self
            .send(emails.notification)
            .await
            .map_err(|_| ContactSubmitError::SendFailed(SendStage::Notification))?;

        let auto_reply_id = self.send(emails.auto_reply).await.map_err(|_| {
            warn!(%notification_id, "notification was sent, but the auto-reply failed");
            ContactSubmitError::SendFailed(SendStage::AutoReply)
        })?;

        info!(%notification_id, %auto_reply_id, "contact message dispatched");

        Ok(ContactReceipt {
            submitted_at: now,
            notification_id,
            auto_reply_id,
        })
    }

    #[tracing::instrument(skip_all, fields(client_ip = %client.ip))]
    async fn send_test_email(
        &self,
        client: ClientContext,
    ) -> Result<TestEmailReceipt, ContactTestEmailError> {
        let now = self.time.now();

        if let RateLimitDecision::Rejected { reset_at } =
            self.rate_limit.admit(client.ip, now).await
        {
            return Err(ContactTestEmailError::RateLimited { reset_at });
        }

        if !self.email.is_configured() {
            return Err(ContactTestEmailError::ConfigurationMissing);
        }

        self.verify_transport()
            .await
            .map_err(|_| ContactTestEmailError::TransportUnavailable)?;

        let email = self.compose.compose_test_email(now)?;
        let recipient = email.recipient.clone();

        let message_id = self
            .send(email)
            .await
            .map_err(|_| ContactTestEmailError::SendFailed)?;

        info!(%message_id, %recipient, "test email sent");

        Ok(TestEmailReceipt {
            sent_at: now,
            recipient,
            message_id,
        })
    }
}

/// The transport failed or did not answer in time. Details have already been
/// logged.
#[derive(Debug)]
struct DispatchError;

impl From<DispatchError> for ContactSubmitError {
    fn from(_: DispatchError) -> Self {
        Self::TransportUnavailable
    }
}

impl<Time, RateLimit, EmailS, Compose> ContactFeatureServiceImpl<Time, RateLimit, EmailS, Compose>
where
    EmailS: EmailService,
{
    async fn verify_transport(&self) -> Result<(), DispatchError> {
        self.bounded("verify smtp connection", self.email.ping())
            .await
    }

    async fn send(&self, email: Email) -> Result<MessageId, DispatchError> {
        self.bounded("send email", self.email.send(email)).await
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        future: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, DispatchError> {
        match tokio::time::timeout(self.config.transport_timeout, future).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => {
                error!("Failed to {operation}: {err:#}");
                Err(DispatchError)
            }
            Err(_) => {
                error!(
                    timeout = ?self.config.transport_timeout,
                    "Failed to {operation}: timed out"
                );
                Err(DispatchError)
            }
        }
    }
}
