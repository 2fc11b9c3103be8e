//! Polls a cluster until it leaves the `creating` state.
//!
//! The loop checks the cancellation token between polls and can be bounded
//! by an overall timeout. Any status other than `creating` ends the wait;
//! deciding whether that status is usable is left to the caller.

use crate::inspector;
use crate::ProvisionError;
use common::types::{ClusterStatus, Lookup};
use log::info;
use shared_clients::aws::RedshiftControlPlane;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("wait for cluster '{cluster}' was cancelled after {polls} poll(s)")]
    Cancelled { cluster: String, polls: u32 },
    #[error("cluster '{cluster}' still creating after {elapsed:?}")]
    TimedOut { cluster: String, elapsed: Duration },
    #[error("cluster '{cluster}' disappeared while it was being created")]
    ClusterVanished { cluster: String },
    #[error(transparent)]
    Provision(#[from] ProvisionError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitOutcome {
    /// First status observed that is not `creating`.
    pub status: ClusterStatus,
    pub polls: u32,
}

#[derive(Debug, Clone)]
pub struct AvailabilityWaiter {
    interval: Duration,
    timeout: Option<Duration>,
}

impl Default for AvailabilityWaiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl AvailabilityWaiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait while `initial` (and every later poll) reports `creating`.
    pub async fn wait<R>(
        &self,
        redshift: &R,
        cluster_id: &str,
        initial: ClusterStatus,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, WaitError>
    where
        R: RedshiftControlPlane + ?Sized,
    {
        let started = Instant::now();
        let deadline = self.timeout.map(|timeout| started + timeout);
        let mut status = initial;
        let mut polls = 0u32;

        if status.is_creating() {
            info!("Waiting...");
        }

        while status.is_creating() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Wait for cluster {cluster_id} cancelled");
                    return Err(WaitError::Cancelled {
                        cluster: cluster_id.to_string(),
                        polls,
                    });
                }
                _ = until(deadline) => {
                    return Err(WaitError::TimedOut {
                        cluster: cluster_id.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
                _ = sleep(self.interval) => {}
            }

            polls += 1;
            status = match inspector::cluster_status(redshift, cluster_id).await? {
                Lookup::Found(status) => status,
                Lookup::NotFound => {
                    return Err(WaitError::ClusterVanished {
                        cluster: cluster_id.to_string(),
                    })
                }
            };
            info!("Waiting... cluster status: {status}.");
        }

        Ok(WaitOutcome { status, polls })
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{FakeRedshift, CLUSTER_ID};

    #[tokio::test(start_paused = true)]
    async fn polls_twice_for_creating_creating_available() {
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating)
            .then_report([ClusterStatus::Creating, ClusterStatus::Available]);
        let waiter = AvailabilityWaiter::default();
        let started = Instant::now();

        let outcome = waiter
            .wait(
                &redshift,
                CLUSTER_ID,
                ClusterStatus::Creating,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.status, ClusterStatus::Available);
        assert_eq!(outcome.polls, 2);
        assert_eq!(redshift.describe_calls(), 2);
        let elapsed = started.elapsed();
        assert!(elapsed >= DEFAULT_POLL_INTERVAL * 2, "{elapsed:?}");
        assert!(elapsed < DEFAULT_POLL_INTERVAL * 3, "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn non_creating_initial_status_returns_without_polling() {
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Available);
        let outcome = AvailabilityWaiter::default()
            .wait(
                &redshift,
                CLUSTER_ID,
                ClusterStatus::Available,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.polls, 0);
        assert_eq!(redshift.describe_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn other_terminal_status_is_returned_verbatim() {
        let failed = ClusterStatus::Other("incompatible-hsm".into());
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating)
            .then_report([failed.clone()]);

        let outcome = AvailabilityWaiter::default()
            .wait(
                &redshift,
                CLUSTER_ID,
                ClusterStatus::Creating,
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome.status, failed);
        assert_eq!(outcome.polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_stops_before_the_next_poll() {
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = AvailabilityWaiter::default()
            .wait(&redshift, CLUSTER_ID, ClusterStatus::Creating, &cancel)
            .await
            .expect_err("cancelled");

        assert!(matches!(err, WaitError::Cancelled { polls: 0, .. }));
        assert_eq!(redshift.describe_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_bounds_a_cluster_stuck_in_creating() {
        let redshift = FakeRedshift::with_cluster(CLUSTER_ID, ClusterStatus::Creating);
        let waiter = AvailabilityWaiter::new(Duration::from_secs(20))
            .with_timeout(Some(Duration::from_secs(50)));

        let err = waiter
            .wait(
                &redshift,
                CLUSTER_ID,
                ClusterStatus::Creating,
                &CancellationToken::new(),
            )
            .await
            .expect_err("never becomes available");

        assert!(matches!(err, WaitError::TimedOut { .. }));
        assert_eq!(redshift.describe_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cluster_deleted_mid_wait_is_reported() {
        let redshift = FakeRedshift::absent();
        let err = AvailabilityWaiter::default()
            .wait(
                &redshift,
                CLUSTER_ID,
                ClusterStatus::Creating,
                &CancellationToken::new(),
            )
            .await
            .expect_err("cluster is gone");
        assert!(matches!(err, WaitError::ClusterVanished { .. }));
    }
}
