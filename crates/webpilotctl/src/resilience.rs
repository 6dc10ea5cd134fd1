//! Condition-based waiting primitives
//!
//! Every wait in the engine goes through these: a generic "block until the
//! predicate holds or the budget elapses" poller and the network-settle wait
//! used after navigation and suggestion-triggering input. There is no
//! unconditional forced interaction anywhere - bypassing these checks would
//! hide genuine obstruction errors.

use crate::driver::{DriverError, DriverResult, UiDriver};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("condition not met within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// One poll of the condition, borrowing the shared state for its duration.
pub type Probe<'a> = Pin<Box<dyn Future<Output = DriverResult<bool>> + Send + 'a>>;

/// Block until `probe` reports true or `timeout` elapses, polling every
/// `poll` interval. The first probe runs immediately, so an
/// already-satisfied condition returns without any polling delay.
pub async fn wait_until<S, F>(
    state: &mut S,
    mut probe: F,
    timeout: Duration,
    poll: Duration,
) -> Result<(), WaitError>
where
    S: ?Sized + Send,
    F: for<'a> FnMut(&'a mut S) -> Probe<'a>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if probe(&mut *state).await? {
            return Ok(());
        }
        if Instant::now() + poll > deadline {
            return Err(WaitError::Timeout(timeout));
        }
        sleep(poll).await;
    }
}

/// Block until the transport reports an idle window, then apply a short
/// fixed settle buffer for pending visual updates.
pub async fn settle_network<D>(
    driver: &mut D,
    timeout: Duration,
    poll: Duration,
    settle_buffer: Duration,
) -> Result<(), WaitError>
where
    D: UiDriver + ?Sized,
{
    wait_until(
        driver,
        |d| Box::pin(async move { Ok(d.pending_requests().await? == 0) }),
        timeout,
        poll,
    )
    .await?;

    sleep(settle_buffer).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn satisfied_condition_returns_without_polling_delay() {
        let mut polls = 0u32;
        let started = Instant::now();

        wait_until(
            &mut polls,
            |count| {
                Box::pin(async move {
                    *count += 1;
                    Ok(true)
                })
            },
            Duration::from_secs(5),
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        assert_eq!(polls, 1);
        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn condition_becoming_true_is_observed() {
        let mut polls = 0u32;

        wait_until(
            &mut polls,
            |count| {
                Box::pin(async move {
                    *count += 1;
                    Ok(*count >= 3)
                })
            },
            Duration::from_secs(5),
            Duration::from_millis(10),
        )
        .await
        .unwrap();

        assert_eq!(polls, 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_times_out() {
        let mut state = ();
        let err = wait_until(
            &mut state,
            |_| Box::pin(async move { Ok(false) }),
            Duration::from_millis(50),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WaitError::Timeout(_)));
    }

    #[tokio::test]
    async fn driver_errors_abort_the_wait() {
        let mut state = ();
        let err = wait_until(
            &mut state,
            |_| Box::pin(async move { Err(DriverError::Gone) }),
            Duration::from_secs(1),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();

        assert_eq!(err, WaitError::Driver(DriverError::Gone));
    }
}
