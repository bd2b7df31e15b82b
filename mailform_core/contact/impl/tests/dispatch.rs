use std::{
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
    time::Duration,
};

use mailform_core_contact_contracts::{ContactFeatureService, ContactSubmitError, SendStage};
use mailform_core_contact_impl::{
    compose::{ContactComposeServiceConfig, ContactComposeServiceImpl},
    ContactFeatureConfig, ContactFeatureServiceImpl,
};
use mailform_demo::{CLIENT, INVALID_SUBMISSION, PUNCTUATED_SUBMISSION, SUBMISSION};
use mailform_email_contracts::{Email, EmailService, MessageId};
use mailform_models::{client::ClientContext, email_address::EmailAddressWithName};
use mailform_shared_impl::{
    rate_limit::{RateLimitServiceConfig, RateLimitServiceImpl},
    time::TimeServiceImpl,
};
use mailform_templates_impl::TemplateServiceImpl;
use mailform_utils::assert_matches;
use pretty_assertions::assert_eq;

type Sut = ContactFeatureServiceImpl<
    TimeServiceImpl,
    RateLimitServiceImpl,
    RecordingTransport,
    ContactComposeServiceImpl<TemplateServiceImpl>,
>;

#[tokio::test]
async fn valid_submission_sends_notification_and_auto_reply() {
    // Arrange
    let transport = RecordingTransport::default();
    let sut = make_sut(transport.clone(), 5);

    // Act
    let receipt = sut
        .submit(SUBMISSION.clone(), CLIENT.clone())
        .await
        .unwrap();

    // Assert
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].recipient, recipient());
    assert_eq!(sent[0].subject, "[Contact Form] Hello there");
    assert_eq!(sent[1].recipient.email(), "al@x.com");
    assert_eq!(
        sent[1].subject,
        "Thank you for your message: Hello there"
    );
    assert_eq!(receipt.notification_id, MessageId("<1@example.com>".into()));
    assert_eq!(receipt.auto_reply_id, MessageId("<2@example.com>".into()));
}

#[tokio::test]
async fn punctuation_reaches_plain_text_parts_unchanged() {
    // Arrange
    let transport = RecordingTransport::default();
    let sut = make_sut(transport.clone(), 5);

    // Act
    sut.submit(PUNCTUATED_SUBMISSION.clone(), CLIENT.clone())
        .await
        .unwrap();

    // Assert
    let sent = transport.sent();
    assert_eq!(sent[0].subject, "[Contact Form] Q&A about pricing");
    assert!(sent[0].text.contains("Name: Chloe O'Brien\n"));
    assert!(sent[0]
        .text
        .contains("Hi, I'm interested in https://example.com/pricing & more."));
    assert_eq!(
        sent[1].subject,
        "Thank you for your message: Q&A about pricing"
    );
    assert!(sent[1].text.starts_with("Hi Chloe O'Brien,\n"));
}

#[tokio::test]
async fn failed_auto_reply_keeps_sent_notification() {
    // Arrange
    let transport = RecordingTransport {
        reject: Some("al@x.com".into()),
        ..Default::default()
    };
    let sut = make_sut(transport.clone(), 5);

    // Act
    let result = sut.submit(SUBMISSION.clone(), CLIENT.clone()).await;

    // Assert
    assert_matches!(
        result,
        Err(ContactSubmitError::SendFailed(SendStage::AutoReply))
    );
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, recipient());
}

#[tokio::test]
async fn sixth_submission_within_window_is_rejected() {
    // Arrange
    let transport = RecordingTransport::default();
    let sut = make_sut(transport.clone(), 5);
    for _ in 0..5 {
        sut.submit(SUBMISSION.clone(), CLIENT.clone())
            .await
            .unwrap();
    }

    // Act
    let result = sut.submit(SUBMISSION.clone(), CLIENT.clone()).await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::RateLimited { .. }));
    assert_eq!(transport.sent().len(), 10);
}

#[tokio::test]
async fn invalid_submissions_count_against_the_limit() {
    // Arrange
    let transport = RecordingTransport::default();
    let sut = make_sut(transport.clone(), 2);
    for _ in 0..2 {
        let result = sut
            .submit(INVALID_SUBMISSION.clone(), CLIENT.clone())
            .await;
        assert_matches!(result, Err(ContactSubmitError::ValidationFailed(_)));
    }

    // Act
    let result = sut.submit(SUBMISSION.clone(), CLIENT.clone()).await;

    // Assert
    assert_matches!(result, Err(ContactSubmitError::RateLimited { .. }));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn clients_are_limited_independently() {
    // Arrange
    let transport = RecordingTransport::default();
    let sut = make_sut(transport.clone(), 1);
    let other = ClientContext {
        ip: IpAddr::V4(Ipv4Addr::new(198, 51, 100, 7)),
        user_agent: None,
    };
    sut.submit(SUBMISSION.clone(), CLIENT.clone())
        .await
        .unwrap();

    // Act
    let rejected = sut.submit(SUBMISSION.clone(), CLIENT.clone()).await;
    let other_result = sut.submit(SUBMISSION.clone(), other).await;

    // Assert
    assert_matches!(rejected, Err(ContactSubmitError::RateLimited { .. }));
    assert!(other_result.is_ok());
}

fn recipient() -> EmailAddressWithName {
    "Contact <contact@example.com>".parse().unwrap()
}

fn make_sut(transport: RecordingTransport, max_requests: u32) -> Sut {
    let compose = ContactComposeServiceImpl::new(
        TemplateServiceImpl::new().unwrap(),
        ContactComposeServiceConfig {
            recipient: recipient().into(),
            preview_length: 100,
        },
    );
    let rate_limit = RateLimitServiceImpl::new(RateLimitServiceConfig {
        max_requests,
        window: Duration::from_secs(15 * 60),
    });

    ContactFeatureServiceImpl::new(
        TimeServiceImpl,
        rate_limit,
        transport,
        compose,
        ContactFeatureConfig {
            transport_timeout: Duration::from_secs(1),
        },
    )
}

/// Transport that keeps every accepted email in memory.
#[derive(Debug, Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<Email>>>,
    /// Recipient address for which every send fails.
    reject: Option<String>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailService for RecordingTransport {
    fn is_configured(&self) -> bool {
        true
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send(&self, email: Email) -> anyhow::Result<MessageId> {
        if self.reject.as_deref() == Some(email.recipient.email()) {
            anyhow::bail!("mailbox unavailable");
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(email);
        Ok(MessageId(format!("<{}@example.com>", sent.len())))
    }
}
