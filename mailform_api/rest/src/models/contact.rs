use chrono::{DateTime, Utc};
use mailform_core_contact_contracts::{ContactReceipt, TestEmailReceipt};
use mailform_email_contracts::MessageId;
use serde::Serialize;

pub const MESSAGE_SENT: &str = "Your message has been sent successfully";
pub const TEST_EMAIL_SENT: &str = "Test email sent successfully";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactReceipt {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub message_ids: ApiMessageIds,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessageIds {
    pub notification: MessageId,
    pub auto_reply: MessageId,
}

impl From<ContactReceipt> for ApiContactReceipt {
    fn from(value: ContactReceipt) -> Self {
        Self {
            success: true,
            message: MESSAGE_SENT,
            timestamp: value.submitted_at,
            message_ids: ApiMessageIds {
                notification: value.notification_id,
                auto_reply: value.auto_reply_id,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTestEmailReceipt {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub message_id: MessageId,
}

impl From<TestEmailReceipt> for ApiTestEmailReceipt {
    fn from(value: TestEmailReceipt) -> Self {
        Self {
            success: true,
            message: TEST_EMAIL_SENT,
            timestamp: value.sent_at,
            recipient: value.recipient.email().into(),
            message_id: value.message_id,
        }
    }
}
