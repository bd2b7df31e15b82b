use chrono::{DateTime, Utc};
use mailform_core_health_contracts::HealthStatus;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealthStatus {
    /// `ok` if mail can be delivered, `degraded` otherwise.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub email_configured: bool,
    pub email: bool,
}

impl ApiHealthStatus {
    pub fn new(status: HealthStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: if status.email { "ok" } else { "degraded" },
            timestamp,
            email_configured: status.email_configured,
            email: status.email,
        }
    }
}
