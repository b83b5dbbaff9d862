use rand::Rng;

use std::time::Duration;

/// Retry policy for statements that fail with the deadlock class.
///
/// The engine re-runs the statement up to `max_attempts` times in total,
/// sleeping a jittered, exponentially growing delay between attempts. Any
/// other failure class surfaces immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff base. The delay before retry `n` is drawn uniformly from
    /// `[base * 2^(n-1) / 2, base * 2^(n-1)]`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Jittered delay slept after failed attempt `attempt` (1-based).
    pub(crate) fn delay(&self, attempt: u32) -> Duration {
        // Capped so the shift cannot overflow.
        let exp = attempt.saturating_sub(1).min(16);
        let cap = self.base_delay.saturating_mul(1u32 << exp);

        let cap_ms = cap.as_millis() as u64;
        if cap_ms == 0 {
            return Duration::ZERO;
        }
        let jittered = rand::thread_rng().gen_range(cap_ms / 2..=cap_ms);
        Duration::from_millis(jittered)
    }
}
