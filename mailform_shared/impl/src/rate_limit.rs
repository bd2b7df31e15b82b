use std::{collections::HashMap, net::IpAddr, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use mailform_shared_contracts::rate_limit::{RateLimitDecision, RateLimitService};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// In-memory fixed window rate limiter.
///
/// Clones share the same window table. Nothing survives a restart.
#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl {
    config: RateLimitServiceConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct RateLimitServiceConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Default)]
struct State {
    windows: Mutex<HashMap<IpAddr, RateWindow>>,
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    start: DateTime<Utc>,
}

impl RateLimitServiceImpl {
    pub fn new(config: RateLimitServiceConfig) -> Self {
        Self {
            config,
            state: Default::default(),
        }
    }

    fn window_end(&self, window: &RateWindow) -> DateTime<Utc> {
        window.start + self.config.window
    }
}

impl RateLimitService for RateLimitServiceImpl {
    #[tracing::instrument(skip(self))]
    async fn admit(&self, client: IpAddr, now: DateTime<Utc>) -> RateLimitDecision {
        let max = self.config.max_requests;
        let mut windows = self.state.windows.lock().await;

        if let Some(window) = windows
            .get_mut(&client)
            .filter(|window| now < self.window_end(window))
        {
            if window.count >= max {
                let reset_at = self.window_end(window);
                debug!(%reset_at, "rate limit exceeded");
                return RateLimitDecision::Rejected { reset_at };
            }

            window.count += 1;
            return RateLimitDecision::Allowed {
                remaining: max - window.count,
            };
        }

        if max == 0 {
            return RateLimitDecision::Rejected {
                reset_at: now + self.config.window,
            };
        }

        let before = windows.len();
        windows.retain(|_, window| now < self.window_end(window));
        trace!(purged = before - windows.len(), "purged expired rate limit windows");

        windows.insert(client, RateWindow { count: 1, start: now });
        RateLimitDecision::Allowed {
            remaining: max - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use chrono::TimeZone;
    use mailform_utils::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    fn sut(max_requests: u32) -> RateLimitServiceImpl {
        RateLimitServiceImpl::new(RateLimitServiceConfig {
            max_requests,
            window: WINDOW,
        })
    }

    fn client(n: u8) -> IpAddr {
        Ipv4Addr::new(192, 0, 2, n).into()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn admits_up_to_max() {
        // Arrange
        let sut = sut(5);
        let now = start();

        // Act
        let mut decisions = Vec::new();
        for i in 0..6 {
            decisions.push(sut.admit(client(1), now + Duration::from_secs(i)).await);
        }

        // Assert
        assert_eq!(
            decisions,
            [4, 3, 2, 1, 0]
                .map(|remaining| RateLimitDecision::Allowed { remaining })
                .into_iter()
                .chain([RateLimitDecision::Rejected {
                    reset_at: now + WINDOW
                }])
                .collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn rejected_requests_are_not_counted() {
        let sut = sut(1);
        let now = start();

        assert_matches!(
            sut.admit(client(1), now).await,
            RateLimitDecision::Allowed { remaining: 0 }
        );
        for _ in 0..10 {
            assert_matches!(
                sut.admit(client(1), now).await,
                RateLimitDecision::Rejected { .. }
            );
        }

        let windows = sut.state.windows.lock().await;
        assert_eq!(windows[&client(1)].count, 1);
    }

    #[tokio::test]
    async fn new_window_after_expiry() {
        // Arrange
        let sut = sut(2);
        let now = start();
        sut.admit(client(1), now).await;
        sut.admit(client(1), now).await;

        // Act
        let just_before = sut.admit(client(1), now + WINDOW - Duration::from_secs(1)).await;
        let after = sut.admit(client(1), now + WINDOW).await;

        // Assert
        assert_eq!(
            just_before,
            RateLimitDecision::Rejected {
                reset_at: now + WINDOW
            }
        );
        assert_eq!(after, RateLimitDecision::Allowed { remaining: 1 });
    }

    #[tokio::test]
    async fn clients_are_independent() {
        let sut = sut(1);
        let now = start();

        assert_matches!(
            sut.admit(client(1), now).await,
            RateLimitDecision::Allowed { .. }
        );
        assert_matches!(
            sut.admit(client(2), now).await,
            RateLimitDecision::Allowed { .. }
        );
        assert_matches!(
            sut.admit(client(1), now).await,
            RateLimitDecision::Rejected { .. }
        );
    }

    #[tokio::test]
    async fn expired_windows_are_purged() {
        // Arrange
        let sut = sut(5);
        let now = start();
        sut.admit(client(1), now).await;
        sut.admit(client(2), now + WINDOW / 2).await;

        // Act
        sut.admit(client(3), now + WINDOW).await;

        // Assert
        let windows = sut.state.windows.lock().await;
        assert!(!windows.contains_key(&client(1)));
        assert!(windows.contains_key(&client(2)));
        assert!(windows.contains_key(&client(3)));
    }

    #[tokio::test]
    async fn zero_max_rejects_everything() {
        let sut = sut(0);
        let now = start();

        assert_eq!(
            sut.admit(client(1), now).await,
            RateLimitDecision::Rejected {
                reset_at: now + WINDOW
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_admits_never_exceed_max() {
        // Arrange
        let sut = sut(25);
        let now = start();

        // Act
        let handles = (0..100)
            .map(|_| {
                let sut = sut.clone();
                tokio::spawn(async move { sut.admit(client(1), now).await })
            })
            .collect::<Vec<_>>();

        let mut allowed = 0;
        for handle in handles {
            if let RateLimitDecision::Allowed { .. } = handle.await.unwrap() {
                allowed += 1;
            }
        }

        // Assert
        assert_eq!(allowed, 25);
    }
}
