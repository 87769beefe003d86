use std::time::Duration;

/// Delay sequence applied between retry attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelaySchedule {
    /// Wait the same duration before every retry.
    Fixed(Duration),
    /// Walk a ladder of delays, one per attempt. The last stage repeats
    /// if there are more attempts than stages.
    Staged(Vec<Duration>),
}

/// Retry behavior for the SPARQL request loop.
///
/// Status codes 429, 500, 502, 503 and 504 are retried after a delay;
/// 408 joins them when `retry_on_timeout` is set. Everything else
/// (400, 404, ...) aborts immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub schedule: DelaySchedule,
    /// Use a 429 response's `Retry-After` value as the next delay.
    pub honor_retry_after: bool,
    pub retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            schedule: DelaySchedule::Staged(vec![
                Duration::from_secs(1),
                Duration::from_secs(20),
                Duration::from_secs(60),
            ]),
            honor_retry_after: true,
            retry_on_timeout: false,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            schedule: DelaySchedule::Fixed(delay),
            ..Self::default()
        }
    }

    pub fn staged(max_attempts: u32, stages: Vec<Duration>) -> Self {
        Self {
            max_attempts,
            schedule: DelaySchedule::Staged(stages),
            ..Self::default()
        }
    }

    pub fn with_timeout_retry(mut self) -> Self {
        self.retry_on_timeout = true;
        self
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504) || (self.retry_on_timeout && status == 408)
    }

    /// Delay before the retry following `attempt` (zero-based).
    ///
    /// `retry_after` carries a parsed `Retry-After` header value and takes
    /// precedence when the policy honors it.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if self.honor_retry_after {
            if let Some(delay) = retry_after {
                return delay;
            }
        }
        match &self.schedule {
            DelaySchedule::Fixed(delay) => *delay,
            DelaySchedule::Staged(stages) => stages
                .get(attempt as usize)
                .or_else(|| stages.last())
                .copied()
                .unwrap_or(Duration::from_secs(1)),
        }
    }
}
