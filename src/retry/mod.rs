//! Exponential-backoff retry for transient vendor failures.
//!
//! The executor is a pure function of the policy and the retryability
//! predicate — it has no knowledge of vendors. Adapters pass
//! [`Error::is_rate_limited`](crate::Error::is_rate_limited) as the
//! predicate so that only throttling/overload responses are repeated;
//! every other failure propagates on the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::error::Error;
use crate::Result;

/// Backoff parameters for one call. Immutable once handed to [`execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Seed for the backoff sequence. The first retry waits
    /// `initial_delay * exponential_base`.
    pub initial_delay: Duration,
    pub exponential_base: f64,
    /// Scale each delay by `1 + random[0,1)` to avoid synchronized
    /// retry herds.
    pub jitter: bool,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1000),
            exponential_base: 2.0,
            jitter: true,
            max_retries: 3,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// The jitterless delay before the k-th retry (1-based):
    /// `initial_delay * exponential_base^k`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64 * self.exponential_base.powi(retry as i32);
        Duration::from_millis(millis as u64)
    }
}

/// Run `operation`, retrying failures the predicate classifies as transient.
///
/// On success returns the value together with the elapsed wall-clock time of
/// the *last* attempt only. A non-retryable error propagates immediately with
/// no delay. Once the attempt count exceeds `max_retries + 1`, fails with
/// [`Error::RetriesExhausted`] carrying the attempt count.
pub async fn execute<T, F, Fut, P>(
    mut operation: F,
    is_retryable: P,
    policy: &RetryPolicy,
) -> Result<(T, Duration)>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&Error) -> bool,
{
    let mut attempts: u32 = 0;
    let mut delay_millis = policy.initial_delay.as_millis() as f64;

    loop {
        attempts += 1;
        let started = Instant::now();
        match operation().await {
            Ok(value) => return Ok((value, started.elapsed())),
            Err(error) => {
                if !is_retryable(&error) {
                    return Err(error);
                }
                if attempts > policy.max_retries {
                    tracing::warn!(attempts, %error, "retry budget exhausted");
                    return Err(Error::RetriesExhausted { attempts });
                }
                let jitter_factor = if policy.jitter {
                    1.0 + rand::random::<f64>()
                } else {
                    1.0
                };
                delay_millis *= policy.exponential_base * jitter_factor;
                tracing::debug!(
                    attempt = attempts,
                    delay_millis = delay_millis as u64,
                    %error,
                    "transient failure, backing off"
                );
                sleep(Duration::from_millis(delay_millis as u64)).await;
            }
        }
    }
}
