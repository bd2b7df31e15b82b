use std::ops::Deref;

use serde::Deserialize;

/// A duration written as whitespace separated parts, e.g. `"1h 30m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s)
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid duration: {s:?}")))
    }
}

fn parse(s: &str) -> Option<std::time::Duration> {
    s.split_whitespace().try_fold(std::time::Duration::ZERO, |out, part| {
        let unit_pos = part.find(|c: char| !c.is_ascii_digit())?;
        let (value, unit) = part.split_at(unit_pos);
        let value = value.parse::<u64>().ok()?;
        let factor = match unit {
            "ms" => return Some(out + std::time::Duration::from_millis(value)),
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 24 * 60 * 60,
            _ => return None,
        };
        Some(out + std::time::Duration::from_secs(value.checked_mul(factor)?))
    })
}
