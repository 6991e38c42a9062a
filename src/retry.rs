// src/retry.rs
use std::future::Future;
use std::time::Duration;

/// Outcome of a retry-wrapped operation. Exhaustion is deliberately a distinct
/// variant rather than an `Option::None`, so an empty-but-successful result
/// can never be mistaken for "all attempts failed".
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Ok(T),
    Exhausted,
}

impl<T> RetryOutcome<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            RetryOutcome::Ok(v) => Some(v),
            RetryOutcome::Exhausted => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryOutcome::Exhausted)
    }
}

/// Bounded retry with exponential backoff, applied uniformly to every
/// unreliable network call (source fetches, recipient lookup, notify).
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    /// Run `op` up to `attempts` times. Each failure is logged and followed by
    /// a backoff sleep of `base_delay * 2^attempt` (the sleep also runs after
    /// the final failure, matching the pacing of the call sites this wraps).
    /// Errors are swallowed; `Exhausted` is the only failure signal.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        for attempt in 0..self.attempts {
            match op().await {
                Ok(v) => return RetryOutcome::Ok(v),
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "operation failed, backing off");
                    tokio::time::sleep(self.base_delay * (1u32 << attempt)).await;
                }
            }
        }
        RetryOutcome::Exhausted
    }
}
