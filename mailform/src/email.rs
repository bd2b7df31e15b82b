use anyhow::Context;
use mailform_config::EmailConfig;
use mailform_email_impl::EmailServiceImpl;

/// Set up the SMTP transport, or an unconfigured one if there is no `[email]`
/// section.
pub fn connect(config: Option<&EmailConfig>) -> anyhow::Result<EmailServiceImpl> {
    let Some(config) = config else {
        return Ok(EmailServiceImpl::unconfigured());
    };

    EmailServiceImpl::new(&config.smtp_url, config.sender(), *config.timeout)
        .context("Failed to connect to SMTP server")
}
