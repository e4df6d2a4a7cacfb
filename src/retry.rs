use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff schedule for retried remote calls: exponential growth dampened by
/// the base, plus jitter so synchronized clients don't retry in lockstep.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_base: f64,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            backoff_base: 1.5,
            jitter: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following 0-based attempt `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.as_millis() as f64 * self.backoff_base.powi(attempt as i32);
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };
        Duration::from_millis(scaled as u64 + jitter)
    }
}

/// Bounded-retry combinator. Runs `op` up to `policy.max_attempts` times,
/// passing the 0-based attempt index. `is_retryable` decides whether a
/// failure is worth another attempt; a terminal failure short-circuits even
/// with attempts remaining. The last error is returned on exhaustion.
pub async fn retry_with_backoff<T, E, C, F, Fut>(
    policy: &RetryPolicy,
    mut is_retryable: C,
    mut op: F,
) -> Result<T, E>
where
    C: FnMut(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err) {
                    tracing::warn!(attempt = attempt + 1, error = %err, "terminal failure, not retrying");
                    return Err(err);
                }
                if attempt + 1 >= policy.max_attempts {
                    tracing::warn!(
                        attempts = policy.max_attempts,
                        error = %err,
                        "retries exhausted"
                    );
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retryable failure, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delay_grows_exponentially_within_jitter_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 0..3 {
            let expected = 1000.0 * 1.5f64.powi(attempt as i32);
            let delay = policy.delay_for(attempt).as_millis() as f64;
            assert!(delay >= expected, "attempt {attempt}: {delay} < {expected}");
            assert!(
                delay < expected + 300.0,
                "attempt {attempt}: {delay} >= {}",
                expected + 300.0
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_failures_until_success() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = retry_with_backoff(
            &policy,
            |_| true,
            |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient".to_string())
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_short_circuits() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_backoff(
            &policy,
            |_| false,
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("bad request".to_string()) }
            },
        )
        .await;

        assert_eq!(result, Err("bad request".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry_with_backoff(
            &policy,
            |_| true,
            |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {attempt}")) }
            },
        )
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
