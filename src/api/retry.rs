use std::time::Duration;

/// Backend notification retry policy: `max_attempts` tries in total, sleeping
/// `base_delay * attempt` after each failed attempt except the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn backoff(&self) -> LinearBackoff {
        LinearBackoff {
            base_delay: self.base_delay,
            retries_left: self.max_attempts.saturating_sub(1),
            attempt: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }
}

/// Delay iterator consumed by `backon`; yields one delay per retry.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base_delay: Duration,
    retries_left: usize,
    attempt: u32,
}

impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.retries_left == 0 {
            return None;
        }
        self.retries_left -= 1;
        self.attempt += 1;
        Some(self.base_delay * self.attempt)
    }
}
