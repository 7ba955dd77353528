//! Bounded retry around unreliable oracle calls
//!
//! Every oracle call (classifier, trust, similarity) goes through the same
//! loop: each attempt runs under a timeout, a failed attempt is logged and
//! followed by a short delay, and exhaustion yields [`RetryExhausted`] as a
//! value instead of aborting the pipeline. With an [`OracleThrottle`], each
//! attempt first waits for a slot; the timeout starts once it has one.

use crate::ports::oracle::OracleError;
use crate::throttle::OracleThrottle;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Retry discipline for oracle calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first one (MAX_RETRY)
    pub max_attempts: usize,
    /// Budget for a single attempt
    pub call_timeout: Duration,
    /// Pause between a failed attempt and the next one
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            call_timeout: Duration::from_secs(20),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// All attempts of one oracle call failed
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{operation} failed after {attempts} attempt(s): {last_error}")]
pub struct RetryExhausted {
    pub operation: String,
    pub attempts: usize,
    pub last_error: OracleError,
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Run `call` until it succeeds or the attempt budget is spent.
    ///
    /// A timeout counts as one failed attempt.
    pub async fn invoke<T, F, Fut>(&self, operation: &str, call: F) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        self.invoke_throttled(operation, None, call).await
    }

    /// Like [`RetryPolicy::invoke`], holding a throttle slot for each attempt.
    ///
    /// The wait for the slot is outside the timed section and the slot is
    /// released before the retry delay.
    pub async fn invoke_throttled<T, F, Fut>(
        &self,
        operation: &str,
        throttle: Option<&OracleThrottle>,
        mut call: F,
    ) -> Result<T, RetryExhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OracleError>>,
    {
        let mut last_error = OracleError::Transport("no attempt was made".to_string());

        for attempt in 1..=self.max_attempts {
            let permit = match throttle {
                Some(throttle) => throttle.admit().await,
                None => None,
            };
            let result = match tokio::time::timeout(self.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(OracleError::Timeout(self.call_timeout)),
            };
            drop(permit);

            match result {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Oracle call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Oracle call failed"
                    );
                    last_error = e;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(RetryExhausted {
            operation: operation.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::default();

        let result = policy
            .invoke("classify", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(OracleError::MalformedOutput("not json".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let errors = Mutex::new(vec![
            OracleError::Http {
                status: 503,
                body: "busy".into(),
            },
            OracleError::Transport("reset".into()),
            OracleError::OutOfRange {
                field: "score",
                value: 1.3,
            },
        ]);
        let policy = RetryPolicy::default();

        let result: Result<(), _> = policy
            .invoke("assess", || {
                let err = errors.lock().unwrap().remove(0);
                async move { Err(err) }
            })
            .await;

        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 3);
        assert_eq!(exhausted.operation, "assess");
        assert!(matches!(
            exhausted.last_error,
            OracleError::OutOfRange { field: "score", .. }
        ));
        assert!(errors.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_consumes_an_attempt() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::default().with_max_attempts(2);

        let result = policy
            .invoke("similarity", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                    Ok::<_, OracleError>("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_calls_do_not_time_out() {
        // One slot, two 15 s calls: the second waits 15 s for the slot and
        // still has its full 20 s once admitted.
        let throttle = OracleThrottle::new(1);
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);
        let start = tokio::time::Instant::now();

        let slow_call = || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(15)).await;
                Ok::<_, OracleError>(())
            }
        };
        let (first, second) = tokio::join!(
            policy.invoke_throttled("classify", Some(&throttle), slow_call),
            policy.invoke_throttled("classify", Some(&throttle), slow_call),
        );

        assert_eq!(first, Ok(()));
        assert_eq!(second, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
        assert_eq!(throttle.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slot_released_during_retry_delay() {
        let throttle = OracleThrottle::new(1);
        let policy = RetryPolicy::default().with_max_attempts(2);
        let seen = Mutex::new(Vec::new());

        let result = policy
            .invoke_throttled("assess", Some(&throttle), || {
                let mut seen = seen.lock().unwrap();
                seen.push(throttle.available());
                let n = seen.len();
                async move {
                    if n == 1 {
                        Err(OracleError::Transport("reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        // The slot is held while each attempt runs
        assert_eq!(*seen.lock().unwrap(), vec![0, 0]);
        assert_eq!(throttle.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_error_is_reported() {
        let policy = RetryPolicy::default()
            .with_max_attempts(1)
            .with_call_timeout(Duration::from_millis(50));

        let result = policy
            .invoke("classify", || async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, OracleError>(())
            })
            .await;

        assert_eq!(
            result.unwrap_err().last_error,
            OracleError::Timeout(Duration::from_millis(50))
        );
    }
}
