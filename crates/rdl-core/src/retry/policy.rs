use crate::config::RetryConfig;
use std::time::Duration;

/// High-level classification of a decode failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The payload could not be parsed; the cached copy may be damaged or stale.
    Corrupt,
    /// The payload is intact but has the wrong shape (e.g. separator absent).
    ContentMismatch,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the loader degrades to an empty result.
    NoRetry,
    /// Sleep for the given delay, purge the cache entry, fetch again.
    RetryAfter(Duration),
}

/// Fixed-delay retry policy (constant sleep between attempts, no exponential growth).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. A load fetches at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Sleep between a decode failure and the next fetch.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` retries and no sleep in between.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Duration::ZERO,
        }
    }

    /// Upper bound on fetches for one load call.
    pub fn max_fetches(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Decide what to do after `attempt` failed with an error of `kind`.
    ///
    /// `attempt` is 0-based (0 = first fetch).
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        match kind {
            ErrorKind::ContentMismatch => RetryDecision::NoRetry,
            ErrorKind::Corrupt if attempt >= self.max_retries => RetryDecision::NoRetry,
            ErrorKind::Corrupt => RetryDecision::RetryAfter(self.backoff),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        // Negative or NaN delays from a hand-edited config collapse to zero.
        let backoff = Duration::try_from_secs_f64(cfg.backoff_secs).unwrap_or(Duration::ZERO);
        Self {
            max_retries: cfg.max_retries,
            backoff,
        }
    }
}
