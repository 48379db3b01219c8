use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Bounded retry with fixed base spacing and optional jitter, used for broker
/// connection establishment at process startup. Waits are cancellation-aware
/// so shutdown never blocks on a sleeping reconnect.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    jitter: Duration,
}

/// Terminal result of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// Some attempt succeeded.
    Succeeded(T),
    /// Every attempt failed; carries the last error seen.
    Exhausted {
        attempts: u32,
        last_error: anyhow::Error,
    },
    /// Shutdown was requested while waiting between attempts.
    Cancelled,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            jitter: Duration::ZERO,
        }
    }

    /// Spread concurrent reconnect storms by adding up to `jitter` on top of
    /// the base delay before each new attempt.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Run `op` until it succeeds, the attempt budget is spent, or `shutdown`
    /// fires during a wait.
    pub async fn run<T, F, Fut>(
        &self,
        op_name: &str,
        shutdown: &CancellationToken,
        mut op: F,
    ) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match op().await {
                Ok(value) => return RetryOutcome::Succeeded(value),
                Err(e) => {
                    warn!(
                        operation = %op_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Attempt failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt < self.max_attempts {
                tokio::select! {
                    _ = shutdown.cancelled() => return RetryOutcome::Cancelled,
                    _ = tokio::time::sleep(self.next_delay()) => {}
                }
            }
        }

        RetryOutcome::Exhausted {
            attempts: self.max_attempts,
            last_error: last_error
                .unwrap_or_else(|| anyhow::anyhow!("retry budget of zero attempts")),
        }
    }

    fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base_delay;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.base_delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> RetryOutcome<T> {
    pub fn into_result(self, op_name: &str) -> anyhow::Result<T> {
        match self {
            RetryOutcome::Succeeded(value) => Ok(value),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Err(last_error.context(format!("{} failed after {} attempts", op_name, attempts))),
            RetryOutcome::Cancelled => Err(anyhow::anyhow!(
                "{} cancelled while waiting to retry",
                op_name
            )),
        }
    }
}
