/// Retry logic with exponential backoff for taxonomy lookups
use occucube_core::{CubeError, CubeResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier (typically 2.0)
    pub multiplier: f32,
    /// Add jitter to prevent thundering herd
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy for the species API: one attempt plus `retries` more
    pub fn for_network(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Default::default()
        }
    }

    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Calculate backoff duration for attempt number
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let mut duration = self.base_backoff(attempt);

        if self.jitter {
            let mut rng = rand::thread_rng();
            let jitter_ms = rng.gen_range(0..=(duration.as_millis() / 4) as u64);
            duration += Duration::from_millis(jitter_ms);
        }

        duration
    }

    fn base_backoff(&self, attempt: u32) -> Duration {
        let mut backoff = self.initial_backoff.as_millis() as f32;
        for _ in 0..attempt {
            backoff *= self.multiplier;
        }
        Duration::from_millis(backoff.min(self.max_backoff.as_millis() as f32) as u64)
    }

    /// Upper bound on the time spent by one retried call
    /// whose attempts each take at most `per_attempt`
    pub fn worst_case(&self, per_attempt: Duration) -> Duration {
        let attempts = self.max_attempts.max(1);
        let mut total = per_attempt * attempts;
        for attempt in 0..attempts - 1 {
            let backoff = self.base_backoff(attempt);
            total += backoff + backoff / 4;
        }
        total
    }
}

/// Execute an async operation, retrying transient failures
///
/// Only errors for which [`CubeError::is_transient`] holds are retried; any
/// other error is returned immediately.
pub async fn with_retry_async<F, Fut, T>(
    mut operation: F,
    policy: &RetryPolicy,
    context: &str,
) -> CubeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CubeResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_error: Option<CubeError> = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", context, attempt);
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_transient() {
                    debug!("Non-retryable error in {}: {}", context, err);
                    return Err(err);
                }

                if attempt < attempts - 1 {
                    let backoff = policy.calculate_backoff(attempt);
                    warn!(
                        "Attempt {}/{} failed for {}: {}. Retrying in {:?}",
                        attempt + 1,
                        attempts,
                        context,
                        err,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                } else {
                    error!("All {} attempts failed for {}: {}", attempts, context, err);
                }

                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| CubeError::Other(format!("Retry failed: {}", context))))
}
