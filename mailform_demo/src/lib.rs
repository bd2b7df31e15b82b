//! Fixtures shared by the tests of all crates.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::LazyLock,
};

use chrono::{DateTime, TimeZone, Utc};
use mailform_models::{
    client::ClientContext,
    contact::{ContactMessage, RawSubmission},
};

pub static NOW: LazyLock<DateTime<Utc>> =
    LazyLock::new(|| Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap());

pub const CLIENT_IP: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 42));

pub static CLIENT: LazyLock<ClientContext> = LazyLock::new(|| ClientContext {
    ip: CLIENT_IP,
    user_agent: Some("Mozilla/5.0 (X11; Linux x86_64)".into()),
});

pub static SUBMISSION: LazyLock<RawSubmission> = LazyLock::new(|| RawSubmission {
    name: "Al".into(),
    email: "al@x.com".into(),
    subject: "Hello there".into(),
    message: "This is a test message.".into(),
});

pub static LONG_SUBMISSION: LazyLock<RawSubmission> = LazyLock::new(|| RawSubmission {
    name: "Max Mustermann".into(),
    email: "max.mustermann@example.de".into(),
    subject: "Question about <your> service".into(),
    message: format!(
        "Hello,\n\nI have a question & a remark.\n\n{}\n\nBest regards\nMax",
        "Lorem ipsum dolor sit amet. ".repeat(10)
    )
    .into(),
});

pub static PUNCTUATED_SUBMISSION: LazyLock<RawSubmission> = LazyLock::new(|| RawSubmission {
    name: "Chloe O'Brien".into(),
    email: "chloe@example.com".into(),
    subject: "Q&A about pricing".into(),
    message: "Hi, I'm interested in https://example.com/pricing & more.".into(),
});

pub static INVALID_SUBMISSION: LazyLock<RawSubmission> = LazyLock::new(|| RawSubmission {
    name: "".into(),
    email: "bad".into(),
    subject: "Hi".into(),
    message: "short".into(),
});

pub static MESSAGE: LazyLock<ContactMessage> =
    LazyLock::new(|| ContactMessage::validate(SUBMISSION.clone()).unwrap());

pub static LONG_MESSAGE: LazyLock<ContactMessage> =
    LazyLock::new(|| ContactMessage::validate(LONG_SUBMISSION.clone()).unwrap());

pub static PUNCTUATED_MESSAGE: LazyLock<ContactMessage> =
    LazyLock::new(|| ContactMessage::validate(PUNCTUATED_SUBMISSION.clone()).unwrap());
