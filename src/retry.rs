//! Bounded polling for capabilities that become available eventually.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// How many times to poll and how long to wait before each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_millis(200),
        }
    }
}

/// Result of [`poll_until`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready { value: T, attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }
}

/// Poll `check` until it yields `Some`, at most `policy.max_attempts` times.
///
/// Each attempt sleeps `policy.delay` first, then awaits the check with the
/// 1-based attempt number. Attempts never overlap.
pub async fn poll_until<T, F, Fut>(policy: PollPolicy, mut check: F) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.delay).await;
        if let Some(value) = check(attempt).await {
            debug!(attempt, "Poll succeeded");
            return PollOutcome::Ready { value, attempts: attempt };
        }
    }
    debug!(attempts = policy.max_attempts, "Poll exhausted");
    PollOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}
