use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use mailform_config::Config;
use mailform_core_contact_contracts::compose::ContactComposeService;
use mailform_core_contact_impl::compose::ContactComposeServiceImpl;
use mailform_email_contracts::EmailService;
use mailform_models::email_address::EmailAddressWithName;
use mailform_templates_impl::TemplateServiceImpl;
use tracing::info;

use crate::{email, environment::contact_compose_config};

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Test email deliverability
    Test {
        /// Where to send the test email
        recipient: EmailAddressWithName,
    },
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_config = config
        .email
        .as_ref()
        .context("No smtp server configured, add an [email] section")?;
    let email_service = email::connect(Some(email_config))?;

    email_service
        .ping()
        .await
        .context("Failed to connect to smtp server")?;

    let compose = ContactComposeServiceImpl::new(
        TemplateServiceImpl::new()?,
        contact_compose_config(recipient, config.contact.preview_length),
    );
    let email = compose.compose_test_email(Utc::now())?;
    let recipient = email.recipient.clone();

    let message_id = email_service.send(email).await?;
    info!(%recipient, %message_id, "Test email sent");

    Ok(())
}
