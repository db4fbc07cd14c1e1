//! Jittered exponential backoff for reconnect scheduling.

use std::time::Duration;

use rand::Rng;

/// Configuration for the reconnect policy.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Consecutive failures tolerated before the client gives up and
    /// parks in fallback.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on exponential growth.
    pub max_delay: Duration,
    /// Multiplier applied to the delay on each attempt.
    pub multiplier: f64,
    /// Upper bound of the uniform random jitter added to every delay.
    /// Spreads retries across instances so they don't stampede a server
    /// that just came back.
    pub jitter: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: Duration::from_millis(1000),
        }
    }
}

/// Stateless reconnect policy — computes the delay for a given attempt.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub config: BackoffConfig,
}

impl ReconnectPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    /// Delay before the `attempt`-th retry (1-based): capped exponential
    /// growth plus a uniform jitter draw in `[0, jitter)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base_ms = self.config.initial_delay.as_millis() as f64
            * self.config.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped_ms = base_ms.min(self.config.max_delay.as_millis() as f64) as u64;

        let jitter_ms = self.config.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };

        Duration::from_millis(capped_ms + jitter)
    }

    /// Returns `true` once `attempts` consecutive failures have spent the
    /// retry budget.
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.config.max_retries
    }
}
