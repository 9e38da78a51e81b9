//! Exponential backoff with multiplicative jitter.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use crate::config::RetryPolicy;

/// Delay before retrying after failed attempt `attempt` (1-indexed).
///
/// `floor(base * 2^(attempt-1) * jitter)`, clamped to `[0, max_delay_ms]`.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32, jitter: f64) -> Duration {
    let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
    let raw = (policy.base_delay_ms as f64 * 2f64.powi(exponent) * jitter).floor();
    let capped = if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, policy.max_delay_ms as f64)
    };
    Duration::from_millis(capped as u64)
}

pub fn jittered_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let jitter = rand::rng().random_range(0.5..1.5);
    backoff_delay(policy, attempt, jitter)
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// The operation receives the 1-indexed attempt number. The error of the
/// last attempt is returned unchanged.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1u32;

    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => {
                error!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "Fetch attempt failed, no retries left"
                );
                return Err(err);
            }
            Err(err) => {
                let delay = jittered_delay(policy, attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Fetch attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
