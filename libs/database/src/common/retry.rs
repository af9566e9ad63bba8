use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy used when (re)connecting to a database at startup
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay in milliseconds
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after each failure
    pub backoff_multiplier: f64,

    /// Scale each delay by a random 50-100% factor
    pub use_jitter: bool,
}

impl RetryConfig {
    /// Defaults: 3 retries, 100ms initial delay, 5s cap, x2 backoff, jitter on
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay before retry number `attempt` (1-based), before jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = (self.initial_delay_ms as f64 * factor) as u64;
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Retry an async operation with exponential backoff.
///
/// The operation runs at most `max_retries + 1` times. The last error is
/// returned unchanged.
///
/// # Example
/// ```ignore
/// use database::common::retry::{retry_with_backoff, RetryConfig};
///
/// let client = retry_with_backoff(
///     || database::mongodb::connect_from_config(&config),
///     RetryConfig::new().with_max_retries(5),
/// )
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(retries = attempt, "Operation succeeded after retrying");
                }
                return Ok(result);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    warn!(attempts = attempt, error = %e, "Operation failed, giving up");
                    return Err(e);
                }

                let delay = config.delay_for(attempt);
                let delay = if config.use_jitter {
                    apply_jitter(delay)
                } else {
                    delay
                };

                warn!(
                    attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    "Operation failed, retrying in {}ms",
                    delay.as_millis()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Scale `delay` by a pseudo-random factor between 50% and 100%
fn apply_jitter(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let random_factor =
        (RandomState::new().hash_one(std::time::SystemTime::now()) % 50) as f64 / 100.0 + 0.5;

    delay.mul_f64(random_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("connected")
                }
            },
            RetryConfig::default(),
        )
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let config = RetryConfig::new().with_initial_delay(10).without_jitter();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    let count = counter.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err(format!("server selection timeout {}", count + 1))
                    } else {
                        Ok("connected")
                    }
                }
            },
            config,
        )
        .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_max_retries_exceeded() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let config = RetryConfig::new()
            .with_max_retries(2)
            .with_initial_delay(10)
            .without_jitter();

        let result = retry_with_backoff(
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<String, _>("connection refused")
                }
            },
            config,
        )
        .await;

        assert_eq!(result.unwrap_err(), "connection refused");
        // 1 initial + 2 retries
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let config = RetryConfig::new().with_initial_delay(100).with_max_delay(350);

        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(350));
        assert_eq!(config.delay_for(10), Duration::from_millis(350));
    }

    #[test]
    fn test_apply_jitter_stays_in_range() {
        let delay = Duration::from_millis(1000);
        for _ in 0..10 {
            let jittered = apply_jitter(delay);
            assert!(jittered >= Duration::from_millis(500));
            assert!(jittered <= delay);
        }
    }
}
