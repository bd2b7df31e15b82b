use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use mailform_core_health_contracts::{HealthFeatureService, HealthStatus};
use mailform_email_contracts::EmailService;
use mailform_shared_contracts::time::TimeService;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Time, Email> {
    time: Time,
    email: Email,
    config: HealthFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
}

impl<Time, Email> HealthFeatureServiceImpl<Time, Email> {
    pub fn new(time: Time, email: Email, config: HealthFeatureConfig) -> Self {
        Self {
            time,
            email,
            config,
            state: Default::default(),
        }
    }
}

impl<Time, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Email>
where
    Time: TimeService,
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = self.time.now();
        let cache_guard = self.state.cache.read().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.status;
        }
        drop(cache_guard);

        let mut cache_guard = self.state.cache.write().await;
        if let Some(cached) = cache_guard
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
        {
            return cached.status;
        }

        let email_configured = self.email.is_configured();
        let email = email_configured
            && self
                .email
                .ping()
                .await
                .inspect_err(|err| error!("Failed to ping smtp server: {err}"))
                .is_ok();

        let status = HealthStatus {
            email_configured,
            email,
        };

        cache_guard
            .insert(CachedStatus {
                status,
                timestamp: now,
            })
            .status
    }
}
