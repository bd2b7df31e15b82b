use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mailform_core_contact_contracts::compose::{
    ContactComposeService, ContactEmails, SubmissionMetadata,
};
use mailform_email_contracts::Email;
use mailform_models::{
    contact::ContactMessage,
    email_address::EmailAddressWithName,
    sanitize::{escape_html, truncate},
};
use mailform_templates_contracts::{
    ContactAutoReplyTemplate, ContactNotificationTemplate, TemplateService, TestEmailTemplate,
};

#[derive(Debug, Clone)]
pub struct ContactComposeServiceImpl<Template> {
    template: Template,
    config: ContactComposeServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactComposeServiceConfig {
    /// Where notifications and test emails go.
    pub recipient: Arc<EmailAddressWithName>,
    /// Number of characters of the message echoed back in the auto-reply.
    pub preview_length: usize,
}

impl<Template> ContactComposeServiceImpl<Template> {
    pub fn new(template: Template, config: ContactComposeServiceConfig) -> Self {
        Self { template, config }
    }
}

impl<TemplateS> ContactComposeService for ContactComposeServiceImpl<TemplateS>
where
    TemplateS: TemplateService,
{
    #[tracing::instrument(skip_all)]
    fn compose(
        &self,
        message: &ContactMessage,
        metadata: &SubmissionMetadata,
    ) -> anyhow::Result<ContactEmails> {
        let sender = EmailAddressWithName::from(message.email().clone());

        let user_agent = metadata.client.user_agent.as_deref().unwrap_or("Unknown");

        let notification = self.template.render(&ContactNotificationTemplate {
            name: message.name().into(),
            name_html: message.name_html().into(),
            email: message.email().as_str().into(),
            email_html: escape_html(message.email().as_str()),
            subject: message.subject().into(),
            subject_html: message.subject_html().into(),
            message: message.content().into(),
            message_html: message.content_html().replace('\n', "<br>\n"),
            submitted_at: format_timestamp(metadata.submitted_at),
            client_ip: metadata.client.ip.to_string(),
            user_agent: user_agent.into(),
            user_agent_html: escape_html(user_agent),
        })?;

        let (preview, truncated) = match truncate(message.content(), self.config.preview_length) {
            Some(preview) => (preview, true),
            None => (message.content(), false),
        };

        let auto_reply = self.template.render(&ContactAutoReplyTemplate {
            name: message.name().into(),
            name_html: message.name_html().into(),
            subject: message.subject().into(),
            subject_html: message.subject_html().into(),
            preview: preview.into(),
            preview_html: escape_html(preview),
            truncated,
        })?;

        Ok(ContactEmails {
            notification: Email {
                recipient: (*self.config.recipient).clone(),
                subject: format!("[Contact Form] {}", message.subject()),
                text: notification.text,
                html: Some(notification.html),
                reply_to: Some(sender.clone()),
            },
            auto_reply: Email {
                recipient: sender,
                subject: format!("Thank you for your message: {}", message.subject()),
                text: auto_reply.text,
                html: Some(auto_reply.html),
                reply_to: None,
            },
        })
    }

    #[tracing::instrument(skip(self))]
    fn compose_test_email(&self, sent_at: DateTime<Utc>) -> anyhow::Result<Email> {
        let rendered = self.template.render(&TestEmailTemplate {
            sent_at: format_timestamp(sent_at),
        })?;

        Ok(Email {
            recipient: (*self.config.recipient).clone(),
            subject: "Email Deliverability Test".into(),
            text: rendered.text,
            html: Some(rendered.html),
            reply_to: None,
        })
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use mailform_demo::{
        CLIENT, LONG_MESSAGE, LONG_SUBMISSION, MESSAGE, NOW, PUNCTUATED_MESSAGE,
        PUNCTUATED_SUBMISSION, SUBMISSION,
    };
    use mailform_models::client::ClientContext;
    use mailform_templates_contracts::{MockTemplateService, RenderedTemplate};
    use mailform_templates_impl::TemplateServiceImpl;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sut() -> ContactComposeServiceImpl<TemplateServiceImpl> {
        ContactComposeServiceImpl::new(
            TemplateServiceImpl::new().unwrap(),
            ContactComposeServiceConfig {
                recipient: Arc::new("Contact Form <contact@example.com>".parse().unwrap()),
                preview_length: 150,
            },
        )
    }

    fn metadata() -> SubmissionMetadata {
        SubmissionMetadata {
            submitted_at: *NOW,
            client: CLIENT.clone(),
        }
    }

    /// Reads the fields back out of a plain text notification.
    fn parse_notification(text: &str) -> (String, String, String, String) {
        let field = |prefix: &str| {
            text.lines()
                .find_map(|line| line.strip_prefix(prefix))
                .unwrap()
                .to_owned()
        };
        let (_, rest) = text.split_once("\nMessage:\n").unwrap();
        let (content, _) = rest.rsplit_once("\n\n---\n").unwrap();
        (
            field("Name: "),
            field("Email: "),
            field("Subject: "),
            content.to_owned(),
        )
    }

    #[test]
    fn notification() {
        // Act
        let result = sut().compose(&MESSAGE, &metadata()).unwrap();

        // Assert
        let notification = result.notification;
        assert_eq!(
            notification.recipient,
            "Contact Form <contact@example.com>"
                .parse::<EmailAddressWithName>()
                .unwrap()
        );
        assert_eq!(notification.subject, "[Contact Form] Hello there");
        assert_eq!(
            notification.reply_to,
            Some("al@x.com".parse::<EmailAddressWithName>().unwrap())
        );
        assert!(notification.text.contains("Submitted at: 2024-07-01T12:00:00Z"));
        assert!(notification.text.contains("IP address: 192.0.2.42"));
        assert!(notification
            .text
            .contains("User agent: Mozilla/5.0 (X11; Linux x86_64)"));
        let html = notification.html.unwrap();
        assert!(html.contains("This is a test message."));
        assert!(html.contains("User agent: Mozilla&#x2F;5.0 (X11; Linux x86_64)"));
    }

    #[test]
    fn notification_round_trip() {
        for (message, submission) in [
            (&*MESSAGE, &*SUBMISSION),
            (&*LONG_MESSAGE, &*LONG_SUBMISSION),
            (&*PUNCTUATED_MESSAGE, &*PUNCTUATED_SUBMISSION),
        ] {
            // Act
            let result = sut().compose(message, &metadata()).unwrap();

            // Assert
            assert_eq!(
                parse_notification(&result.notification.text),
                (
                    submission.name.as_str().unwrap().to_owned(),
                    submission.email.as_str().unwrap().to_owned(),
                    submission.subject.as_str().unwrap().to_owned(),
                    submission.message.as_str().unwrap().to_owned(),
                )
            );
        }
    }

    #[test]
    fn plain_text_parts_are_not_escaped() {
        // Act
        let result = sut().compose(&PUNCTUATED_MESSAGE, &metadata()).unwrap();

        // Assert
        assert_eq!(result.notification.subject, "[Contact Form] Q&A about pricing");
        assert_eq!(
            result.auto_reply.subject,
            "Thank you for your message: Q&A about pricing"
        );
        assert!(result.notification.text.contains("Name: Chloe O'Brien\n"));
        assert!(result
            .auto_reply
            .text
            .contains("\nHi, I'm interested in https://example.com/pricing & more.\n"));
        assert!(!result.notification.text.contains("&amp;"));
        assert!(!result.auto_reply.text.contains("&#x27;"));
    }

    #[test]
    fn html_parts_are_escaped() {
        // Act
        let result = sut().compose(&PUNCTUATED_MESSAGE, &metadata()).unwrap();

        // Assert
        let notification = result.notification.html.unwrap();
        assert!(notification.contains("Chloe O&#x27;Brien"));
        assert!(notification.contains("Q&amp;A about pricing"));
        assert!(notification.contains(
            "Hi, I&#x27;m interested in https:&#x2F;&#x2F;example.com&#x2F;pricing &amp; more."
        ));
        let auto_reply = result.auto_reply.html.unwrap();
        assert!(auto_reply.contains("Thank you for reaching out, Chloe O&#x27;Brien!"));
        assert!(!auto_reply.contains("O'Brien"));
    }

    #[test]
    fn notification_html_line_breaks() {
        let result = sut().compose(&LONG_MESSAGE, &metadata()).unwrap();

        let html = result.notification.html.unwrap();
        assert!(html.contains("Hello,<br>\n<br>\nI have a question &amp; a remark.<br>\n"));
        assert!(html.contains("Question about &lt;your&gt; service"));
    }

    #[test]
    fn missing_user_agent() {
        let metadata = SubmissionMetadata {
            submitted_at: *NOW,
            client: ClientContext {
                ip: CLIENT.ip,
                user_agent: None,
            },
        };

        let result = sut().compose(&MESSAGE, &metadata).unwrap();

        assert!(result.notification.text.contains("User agent: Unknown"));
    }

    #[test]
    fn auto_reply() {
        // Act
        let result = sut().compose(&MESSAGE, &metadata()).unwrap();

        // Assert
        let auto_reply = result.auto_reply;
        assert_eq!(
            auto_reply.recipient,
            "al@x.com".parse::<EmailAddressWithName>().unwrap()
        );
        assert_eq!(
            auto_reply.subject,
            "Thank you for your message: Hello there"
        );
        assert_eq!(auto_reply.reply_to, None);
        assert!(auto_reply.text.contains("\nThis is a test message.\n"));
        assert!(!auto_reply.text.contains("..."));
        assert!(auto_reply.html.is_some());
    }

    #[test]
    fn auto_reply_preview_is_truncated() {
        // Act
        let result = sut().compose(&LONG_MESSAGE, &metadata()).unwrap();

        // Assert
        let text = result.auto_reply.text;
        let preview = truncate(LONG_MESSAGE.content(), 150).unwrap();
        assert!(text.contains(&format!("{preview}...")));
        assert!(!text.contains("Best regards\nMax"));
        let html = result.auto_reply.html.unwrap();
        assert!(html.contains(&format!("{}&hellip;", escape_html(preview))));
    }

    #[test]
    fn both_emails_come_from_the_same_message() {
        let result = sut().compose(&MESSAGE, &metadata()).unwrap();

        assert_eq!(
            result.notification.reply_to.as_ref(),
            Some(&result.auto_reply.recipient)
        );
        assert!(result.notification.subject.ends_with(MESSAGE.subject()));
        assert!(result.auto_reply.subject.ends_with(MESSAGE.subject()));
    }

    #[test]
    fn test_email() {
        let result = sut().compose_test_email(*NOW).unwrap();

        assert_eq!(
            result.recipient,
            "Contact Form <contact@example.com>"
                .parse::<EmailAddressWithName>()
                .unwrap()
        );
        assert_eq!(result.subject, "Email Deliverability Test");
        assert!(result.text.contains("Sent at: 2024-07-01T12:00:00Z"));
    }

    #[test]
    fn test_email_uses_rendered_bodies() {
        // Arrange
        let template = MockTemplateService::new().with_render(
            TestEmailTemplate {
                sent_at: "2024-07-01T12:00:00Z".into(),
            },
            RenderedTemplate {
                text: "text body".into(),
                html: "<p>html body</p>".into(),
            },
        );
        let sut = ContactComposeServiceImpl::new(
            template,
            ContactComposeServiceConfig {
                recipient: Arc::new("contact@example.com".parse().unwrap()),
                preview_length: 150,
            },
        );

        // Act
        let result = sut.compose_test_email(*NOW).unwrap();

        // Assert
        assert_eq!(
            result,
            Email {
                recipient: "contact@example.com".parse().unwrap(),
                subject: "Email Deliverability Test".into(),
                text: "text body".into(),
                html: Some("<p>html body</p>".into()),
                reply_to: None,
            }
        );
    }
}
