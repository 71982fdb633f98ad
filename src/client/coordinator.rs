//! Single-flight recovery from an expired access cookie.
//!
//! Every protected request records [`RefreshCoordinator::epoch`] before it is
//! sent. When it comes back 401 it calls [`RefreshCoordinator::refresh`] with
//! that epoch: concurrent callers share one refresh round-trip, and a caller
//! whose 401 arrives after a refresh has already settled reuses that outcome
//! instead of starting another.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::client::error::ClientError;

pub type RefreshOutcome = Result<(), Arc<ClientError>>;

/// The transport half of a refresh.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Exchanges the refresh cookie for a new access cookie.
    async fn refresh_session(&self) -> Result<(), ClientError>;

    /// Local logout after a failed refresh.
    async fn end_session(&self);
}

#[derive(Default)]
struct Slot {
    epoch: u64,
    in_flight: Option<Shared<BoxFuture<'static, RefreshOutcome>>>,
    last: Option<RefreshOutcome>,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    refresher: Arc<dyn SessionRefresher>,
    slot: Arc<Mutex<Slot>>,
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<dyn SessionRefresher>) -> Self {
        Self {
            refresher,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Number of refreshes that have settled so far.
    pub async fn epoch(&self) -> u64 {
        self.slot.lock().await.epoch
    }

    /// Waits for a refresh that covers a request sent at `observed_epoch`,
    /// starting one only if none is running.
    pub async fn refresh(&self, observed_epoch: u64) -> RefreshOutcome {
        let pending = {
            let mut slot = self.slot.lock().await;
            if slot.epoch != observed_epoch {
                if let Some(outcome) = slot.last.clone() {
                    debug!(epoch = slot.epoch, "reusing settled refresh outcome");
                    return outcome;
                }
            }

            match &slot.in_flight {
                Some(pending) => pending.clone(),
                None => {
                    let pending = self.start().shared();
                    slot.in_flight = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    fn start(&self) -> BoxFuture<'static, RefreshOutcome> {
        let refresher = self.refresher.clone();
        let slot = self.slot.clone();

        async move {
            debug!("refreshing session");
            let outcome = refresher.refresh_session().await.map_err(Arc::new);
            if let Err(err) = &outcome {
                warn!(%err, "session refresh failed; logging out");
                refresher.end_session().await;
            }

            let mut slot = slot.lock().await;
            slot.in_flight = None;
            slot.epoch += 1;
            slot.last = Some(outcome.clone());
            outcome
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;

    /// Holds every refresh open until `release` is notified.
    struct GatedRefresher {
        calls: AtomicUsize,
        ended: AtomicUsize,
        gate: Notify,
        succeed: bool,
    }

    impl GatedRefresher {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                ended: AtomicUsize::new(0),
                gate: Notify::new(),
                succeed,
            })
        }
    }

    #[async_trait]
    impl SessionRefresher for GatedRefresher {
        async fn refresh_session(&self) -> Result<(), ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.succeed {
                Ok(())
            } else {
                Err(ClientError::Unauthorized {
                    message: "Refresh token expired".into(),
                    code: None,
                })
            }
        }

        async fn end_session(&self) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_for_calls(refresher: &GatedRefresher, expected: usize) {
        while refresher.calls.load(Ordering::SeqCst) < expected {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let refresher = GatedRefresher::new(true);
        let coordinator = RefreshCoordinator::new(refresher.clone());
        let epoch = coordinator.epoch().await;

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.refresh(epoch).await })
            })
            .collect();

        wait_for_calls(&refresher, 1).await;
        // Let the other waiters reach the in-flight future.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        refresher.gate.notify_one();

        for waiter in waiters {
            assert!(waiter.await.unwrap().is_ok());
        }
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.epoch().await, 1);
        assert_eq!(refresher.ended.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_fails_everyone_and_logs_out_once() {
        let refresher = GatedRefresher::new(false);
        let coordinator = RefreshCoordinator::new(refresher.clone());

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.refresh(0).await })
            })
            .collect();

        wait_for_calls(&refresher, 1).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        refresher.gate.notify_one();

        for waiter in waiters {
            assert!(waiter.await.unwrap().is_err());
        }
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(refresher.ended.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn late_failure_reuses_settled_outcome() {
        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(1)
            .returning(|| Ok(()));
        refresher.expect_end_session().never();
        let coordinator = RefreshCoordinator::new(Arc::new(refresher));

        let observed = coordinator.epoch().await;
        assert!(coordinator.refresh(observed).await.is_ok());
        // A request sent before that refresh settled comes back 401 afterwards.
        assert!(coordinator.refresh(observed).await.is_ok());
        assert_eq!(coordinator.epoch().await, 1);
    }

    #[tokio::test]
    async fn sequential_expiries_refresh_again() {
        let mut refresher = MockSessionRefresher::new();
        refresher
            .expect_refresh_session()
            .times(2)
            .returning(|| Ok(()));
        let coordinator = RefreshCoordinator::new(Arc::new(refresher));

        let first = coordinator.epoch().await;
        coordinator.refresh(first).await.unwrap();
        let second = coordinator.epoch().await;
        coordinator.refresh(second).await.unwrap();

        assert_eq!(coordinator.epoch().await, 2);
    }

    #[tokio::test]
    async fn failure_runs_logout() {
        let mut refresher = MockSessionRefresher::new();
        refresher.expect_refresh_session().times(1).returning(|| {
            Err(ClientError::Unauthorized {
                message: "Invalid refresh token".into(),
                code: None,
            })
        });
        refresher.expect_end_session().times(1).returning(|| ());
        let coordinator = RefreshCoordinator::new(Arc::new(refresher));

        let err = coordinator.refresh(0).await.unwrap_err();
        assert!(matches!(*err, ClientError::Unauthorized { .. }));
    }
}
