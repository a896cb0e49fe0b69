//! Bounded retry loop used to confirm an upgrade.
//!
//! An attempt either yields a value, asks to be retried, or fails fatally.
//! The loop stops at the first success, the first fatal failure, the
//! deadline, or cancellation, whichever comes first. An attempt still in
//! flight when the deadline passes is abandoned.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tokio_util::sync::CancellationToken;

/// Why an attempt did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    /// Not there yet; try again after the poll interval
    Retry(String),
    /// Retrying cannot help
    Fatal(String),
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    TimedOut {
        /// Reason given by the last retried attempt
        last: Option<String>,
        attempts: u32,
    },
    Failed(String),
    Cancelled,
}

/// Runs `attempt` every `every` until it succeeds or `timeout` elapses.
///
/// The first attempt starts immediately.
pub async fn poll_until<T, F, Fut>(
    mut attempt: F,
    every: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> PollOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt>>,
{
    let deadline = Instant::now() + timeout;
    let mut ticker = interval(every.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let mut last = None;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = attempt() => result,
            _ = sleep_until(deadline) => return PollOutcome::TimedOut { last, attempts },
        };

        match result {
            Ok(value) => return PollOutcome::Ready(value),
            Err(Attempt::Fatal(reason)) => return PollOutcome::Failed(reason),
            Err(Attempt::Retry(reason)) => {
                log::debug!("Attempt {} not ready: {}", attempts, reason);
                last = Some(reason);
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = sleep_until(deadline) => return PollOutcome::TimedOut { last, attempts },
            _ = ticker.tick() => {}
        }
    }
}
