use std::{future::Future, net::IpAddr};

use chrono::{DateTime, Utc};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Counts a request from `client` against its current window.
    ///
    /// Requests beyond the configured maximum are rejected without being
    /// counted.
    fn admit(
        &self,
        client: IpAddr,
        now: DateTime<Utc>,
    ) -> impl Future<Output = RateLimitDecision> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        /// Number of requests still admitted in the current window.
        remaining: u32,
    },
    Rejected {
        /// When the current window ends and requests are admitted again.
        reset_at: DateTime<Utc>,
    },
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_admit(
        mut self,
        client: IpAddr,
        now: DateTime<Utc>,
        result: RateLimitDecision,
    ) -> Self {
        self.expect_admit()
            .once()
            .with(
                mockall::predicate::eq(client),
                mockall::predicate::eq(now),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}
