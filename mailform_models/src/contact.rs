use std::collections::{btree_map, BTreeMap};

use nutype::nutype;
use serde::{Deserialize, Serialize};

use crate::{email_address::EmailAddress, sanitize::escape_html};

pub const EMAIL_MAX_LENGTH: usize = 254;

/// A contact form submission exactly as it was received.
///
/// Every field is optional and may have been sent with the wrong type; see
/// [`RawField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub name: RawField,
    #[serde(default)]
    pub email: RawField,
    #[serde(default)]
    pub subject: RawField,
    #[serde(default)]
    pub message: RawField,
}

/// A single untyped form value.
///
/// Strings are taken as is, numbers and booleans are converted to their
/// string representation. `null`, arrays and objects count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawField(Option<String>);

impl RawField {
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        Self(Some(value.into()))
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Scalar {
            String(String),
            Bool(bool),
            Integer(i64),
            Unsigned(u64),
            Float(f64),
            Other(serde::de::IgnoredAny),
        }

        Ok(Self(match Scalar::deserialize(deserializer)? {
            Scalar::String(x) => Some(x),
            Scalar::Bool(x) => Some(x.to_string()),
            Scalar::Integer(x) => Some(x.to_string()),
            Scalar::Unsigned(x) => Some(x.to_string()),
            Scalar::Float(x) => Some(x.to_string()),
            Scalar::Other(_) => None,
        }))
    }
}

#[nutype(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, AsRef, Deref)
)]
pub struct ContactName(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 5, len_char_max = 200),
    derive(Debug, Clone, PartialEq, Eq, AsRef, Deref)
)]
pub struct ContactSubject(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 1000),
    derive(Debug, Clone, PartialEq, Eq, AsRef, Deref)
)]
pub struct ContactContent(String);

/// A validated and sanitized contact form submission.
///
/// Text fields are trimmed. Each of them is kept as plain text and as an html
/// escaped copy. The only way to obtain a value of this type is
/// [`ContactMessage::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    name: Sanitized,
    email: EmailAddress,
    subject: Sanitized,
    content: Sanitized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Sanitized {
    text: String,
    html: String,
}

impl Sanitized {
    fn new(text: String) -> Self {
        let html = escape_html(&text);
        Self { text, html }
    }
}

impl ContactMessage {
    /// Checks every field of `raw` and either returns the sanitized message or
    /// the complete list of problems.
    pub fn validate(raw: RawSubmission) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = errors.check(ContactField::Name, &raw.name, |value| {
            ContactName::try_new(value.to_owned()).ok()
        });
        let email = errors.check(ContactField::Email, &raw.email, parse_email);
        let subject = errors.check(ContactField::Subject, &raw.subject, |value| {
            ContactSubject::try_new(value.to_owned()).ok()
        });
        let content = errors.check(ContactField::Message, &raw.message, |value| {
            ContactContent::try_new(value.to_owned()).ok()
        });

        match (name, email, subject, content) {
            (Some(name), Some(email), Some(subject), Some(content)) if errors.is_empty() => {
                Ok(Self {
                    name: Sanitized::new(name.into_inner()),
                    email,
                    subject: Sanitized::new(subject.into_inner()),
                    content: Sanitized::new(content.into_inner()),
                })
            }
            _ => Err(errors),
        }
    }

    pub fn name(&self) -> &str {
        &self.name.text
    }

    pub fn name_html(&self) -> &str {
        &self.name.html
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject.text
    }

    pub fn subject_html(&self) -> &str {
        &self.subject.html
    }

    pub fn content(&self) -> &str {
        &self.content.text
    }

    pub fn content_html(&self) -> &str {
        &self.content.html
    }
}

fn parse_email(value: &str) -> Option<EmailAddress> {
    if value.chars().count() > EMAIL_MAX_LENGTH {
        return None;
    }
    value.parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Self::Name => "Name is required",
            Self::Email => "Email is required",
            Self::Subject => "Subject is required",
            Self::Message => "Message is required",
        }
    }

    fn invalid_message(self) -> &'static str {
        match self {
            Self::Name => "Name must be between 2 and 100 characters",
            Self::Email => "Please provide a valid email address",
            Self::Subject => "Subject must be between 5 and 200 characters",
            Self::Message => "Message must be between 10 and 1000 characters",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable problems, one per invalid field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<ContactField, &'static str>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ContactField, &'static str> {
        self.0.iter()
    }

    fn check<T>(
        &mut self,
        field: ContactField,
        raw: &RawField,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let value = raw.as_str().map(str::trim).unwrap_or_default();
        if value.is_empty() {
            self.0.insert(field, field.required_message());
            return None;
        }

        let parsed = parse(value);
        if parsed.is_none() {
            self.0.insert(field, field.invalid_message());
        }
        parsed
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}
