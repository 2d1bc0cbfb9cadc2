use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Retry with Exponential Backoff
// ============================================================================
//
// Wraps integration-event handlers on the bus. Only failures that report
// themselves transient are retried; the domain layer itself never retries.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delays between consecutive attempts, capped at `max_delay`.
    /// A multiplier below 1 is treated as 1.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let multiplier = self.multiplier.max(1.0);
        let cap = self.max_delay;
        std::iter::successors(Some(self.initial_delay.min(cap)), move |delay| {
            let nanos = (delay.as_nanos() as f64 * multiplier).round();
            if nanos >= cap.as_nanos() as f64 {
                Some(cap)
            } else {
                Some(Duration::from_nanos(nanos as u64))
            }
        })
    }
}

/// Final state of a retried operation, with the number of attempts made.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed transiently.
    Exhausted { error: E, attempts: u32 },
    /// Stopped at the first non-transient failure.
    Permanent { error: E, attempts: u32 },
}

/// Classifies an error as worth retrying or not.
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

/// Run `operation` until it succeeds, fails permanently or runs out of
/// attempts. The operation receives the 1-based attempt number.
pub async fn retry_on_transient<F, Fut, T, E>(
    operation_name: &str,
    config: &RetryConfig,
    mut operation: F,
) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + IsTransient,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        operation = operation_name,
                        attempts = attempt,
                        "Succeeded after retry"
                    );
                }
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) => error,
        };

        if !error.is_transient() {
            tracing::error!(
                operation = operation_name,
                attempt,
                error = %error,
                "Permanent failure, not retrying"
            );
            return RetryOutcome::Permanent {
                error,
                attempts: attempt,
            };
        }

        if attempt >= max_attempts {
            tracing::error!(
                operation = operation_name,
                attempts = attempt,
                error = %error,
                "Giving up, retries exhausted"
            );
            return RetryOutcome::Exhausted {
                error,
                attempts: attempt,
            };
        }

        let delay = delays.next().unwrap_or(config.max_delay);
        tracing::warn!(
            operation = operation_name,
            attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "Transient failure, backing off"
        );
        sleep(delay).await;
        attempt += 1;
    }
}
