use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use lettre::{
    message::{header, MultiPart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use mailform_email_contracts::{Email, EmailService, MessageId};
use mailform_models::email_address::EmailAddressWithName;
use mailform_utils::Apply;
use tracing::{debug, warn};
use uuid::Uuid;

/// SMTP backed [`EmailService`].
///
/// Without a configured transport every operation fails.
#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    transport: Option<SmtpTransport>,
}

#[derive(Debug, Clone)]
struct SmtpTransport {
    from: EmailAddressWithName,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailServiceImpl {
    pub fn new(url: &str, from: EmailAddressWithName, timeout: Duration) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(url)
            .context("Invalid smtp url")?
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport: Some(SmtpTransport { from, transport }),
        })
    }

    pub fn unconfigured() -> Self {
        warn!("no smtp server configured, emails cannot be sent");
        Self { transport: None }
    }

    fn configured(&self) -> anyhow::Result<&SmtpTransport> {
        self.transport
            .as_ref()
            .ok_or_else(|| anyhow!("No smtp server configured"))
    }
}

impl SmtpTransport {
    fn build_message(&self, email: Email) -> anyhow::Result<(Message, MessageId)> {
        let message_id = MessageId(format!(
            "<{}@{}>",
            Uuid::new_v4(),
            self.from.0.email.domain()
        ));

        let builder = Message::builder()
            .from(self.from.0.clone())
            .to(email.recipient.0)
            .apply_map(email.reply_to, |builder, reply_to| {
                builder.reply_to(reply_to.0)
            })
            .subject(email.subject)
            .message_id(Some(message_id.0.clone()));

        let message = match email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.text, html)),
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.text),
        }
        .context("Failed to build email")?;

        Ok((message, message_id))
    }
}

impl EmailService for EmailServiceImpl {
    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        self.configured()?
            .transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }

    #[tracing::instrument(skip_all, fields(recipient = %email.recipient))]
    async fn send(&self, email: Email) -> anyhow::Result<MessageId> {
        let smtp = self.configured()?;
        let (message, message_id) = smtp.build_message(email)?;

        let response = smtp.transport.send(message).await?;
        if !response.is_positive() {
            bail!("Smtp server rejected email: {}", response.code());
        }

        debug!(%message_id, "email sent");
        Ok(message_id)
    }
}
