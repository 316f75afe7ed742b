//! Retry with capped exponential backoff.

use std::future::Future;
use std::time::Duration;

use lingua_core::LinguaConfig;
use lingua_core::config::{ConfigResult, InvokeSettings};
use tracing::{debug, warn};

use crate::error::InvokeError;

/// Upper bound on any single backoff delay.
pub const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// How many attempts to make and how long to wait between them.
///
/// The delay after failed attempt `i` (0-based) is `base * 2^i`, capped
/// at `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base: Duration,
    pub ceiling: Duration,
}

impl RetryPolicy {
    /// A policy with at least one attempt and the default ceiling.
    pub fn new(attempts: u32, base: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base,
            ceiling: MAX_BACKOFF,
        }
    }

    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Single attempt, no backoff.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Language detection: 3 attempts, 400 ms base.
    pub fn detect() -> Self {
        Self::new(3, Duration::from_millis(400))
    }

    /// Translation: 3 attempts, 500 ms base.
    pub fn translate() -> Self {
        Self::new(3, Duration::from_millis(500))
    }

    /// Backend connectivity test: 2 attempts, 300 ms base.
    pub fn probe() -> Self {
        Self::new(2, Duration::from_millis(300))
    }

    pub fn from_settings(settings: &InvokeSettings) -> Self {
        Self::new(settings.attempts, settings.backoff).with_ceiling(settings.max_backoff)
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .unwrap_or(self.ceiling)
            .min(self.ceiling)
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn total_delay(&self) -> Duration {
        (0..self.attempts.saturating_sub(1))
            .map(|i| self.delay_for(i))
            .sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::translate()
    }
}

/// The retry policy of each client operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicies {
    pub detect: RetryPolicy,
    pub translate: RetryPolicy,
    pub probe: RetryPolicy,
}

impl RetryPolicies {
    /// Presets overridden by whatever `[invoke]` sets explicitly.
    ///
    /// `attempts`, `backoff` and `max_backoff` each replace the matching
    /// field of every operation's policy; unset fields keep the preset.
    pub fn from_config(config: &LinguaConfig) -> ConfigResult<Self> {
        let settings = config.invoke_settings()?;
        let section = config.invoke.clone().unwrap_or_default();
        let apply = |mut policy: RetryPolicy| {
            if section.attempts.is_some() {
                policy.attempts = settings.attempts;
            }
            if section.backoff.is_some() {
                policy.base = settings.backoff;
            }
            if section.max_backoff.is_some() {
                policy.ceiling = settings.max_backoff;
            }
            policy
        };
        Ok(Self {
            detect: apply(RetryPolicy::detect()),
            translate: apply(RetryPolicy::translate()),
            probe: apply(RetryPolicy::probe()),
        })
    }
}

impl Default for RetryPolicies {
    fn default() -> Self {
        Self {
            detect: RetryPolicy::detect(),
            translate: RetryPolicy::translate(),
            probe: RetryPolicy::probe(),
        }
    }
}

/// Run `op` until it succeeds, fails terminally, or the budget runs out.
///
/// `op` receives the 0-based attempt number. Only retryable errors
/// (`Timeout`, `Network`) trigger another attempt; the last one is
/// wrapped in `RetriesExhausted`.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, InvokeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, InvokeError>>,
{
    let mut attempt = 0;
    loop {
        let err = match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        attempt += 1;
        if attempt >= policy.attempts {
            warn!(attempts = attempt, error = %err, "retry budget exhausted");
            return Err(InvokeError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_for(attempt - 1);
        debug!(
            attempt,
            of = policy.attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient failure, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
