//! Reconnect backoff policy for the chat socket.
//!
//! Delays grow exponentially from one second and cap at thirty, with no
//! jitter. The attempt counter only resets on a successful open; a manual
//! reconnect after the budget is spent keeps the spent counter.

pub const BASE_DELAY_MS: u32 = 1_000;
pub const MAX_DELAY_MS: u32 = 30_000;
pub const MAX_ATTEMPTS: u32 = 5;

/// What the socket should do after an abnormal close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule another connection attempt.
    Retry { attempt: u32, delay_ms: u32 },
    /// The retry budget is spent; report failure once.
    GiveUp,
    /// Failure already reported; stay silent.
    Stop,
}

/// Tracks consecutive failed attempts between successful opens.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
    reported_failure: bool,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            reported_failure: false,
        }
    }

    /// Register one abnormal close and decide the follow-up.
    pub fn record_failure(&mut self) -> RetryDecision {
        if self.attempts >= MAX_ATTEMPTS {
            if self.reported_failure {
                RetryDecision::Stop
            } else {
                self.reported_failure = true;
                RetryDecision::GiveUp
            }
        } else {
            self.attempts += 1;
            RetryDecision::Retry {
                attempt: self.attempts,
                delay_ms: delay_for(self.attempts),
            }
        }
    }

    /// Called on a successful open; the next failure starts over.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.reported_failure = false;
    }

    /// Spend the whole budget silently. Used by manual disconnects so a
    /// straggling close event cannot schedule a retry.
    pub fn exhaust(&mut self) {
        self.attempts = MAX_ATTEMPTS;
        self.reported_failure = true;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay before attempt `attempt` (1-based): `min(1000 * 2^(n-1), 30000)`.
pub fn delay_for(attempt: u32) -> u32 {
    let shift = attempt.saturating_sub(1).min(15);
    (BASE_DELAY_MS << shift).min(MAX_DELAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_from_one_second() {
        assert_eq!(delay_for(1), 1_000);
        assert_eq!(delay_for(2), 2_000);
        assert_eq!(delay_for(3), 4_000);
        assert_eq!(delay_for(4), 8_000);
        assert_eq!(delay_for(5), 16_000);
    }

    #[test]
    fn delays_cap_at_thirty_seconds() {
        assert_eq!(delay_for(6), 30_000);
        assert_eq!(delay_for(60), 30_000);
    }

    #[test]
    fn five_failures_then_a_single_give_up() {
        let mut policy = ReconnectPolicy::new();
        for expected in 1..=MAX_ATTEMPTS {
            match policy.record_failure() {
                RetryDecision::Retry { attempt, delay_ms } => {
                    assert_eq!(attempt, expected);
                    assert_eq!(delay_ms, delay_for(expected));
                }
                other => panic!("expected retry, got {other:?}"),
            }
        }
        assert_eq!(policy.record_failure(), RetryDecision::GiveUp);
        assert_eq!(policy.record_failure(), RetryDecision::Stop);
        assert_eq!(policy.record_failure(), RetryDecision::Stop);
    }

    #[test]
    fn reset_restores_the_full_budget() {
        let mut policy = ReconnectPolicy::new();
        for _ in 0..MAX_ATTEMPTS {
            policy.record_failure();
        }
        assert_eq!(policy.record_failure(), RetryDecision::GiveUp);
        policy.reset();
        assert_eq!(
            policy.record_failure(),
            RetryDecision::Retry {
                attempt: 1,
                delay_ms: 1_000
            }
        );
    }

    #[test]
    fn exhaust_never_reports_failure() {
        let mut policy = ReconnectPolicy::new();
        policy.exhaust();
        assert_eq!(policy.record_failure(), RetryDecision::Stop);
        assert_eq!(policy.attempts(), MAX_ATTEMPTS);
    }
}
