//! Retry pacing: fixed interval or exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

use crate::config::BackoffKind;

/// Delay to sleep after failed attempt number `attempt` (1-based).
pub fn retry_delay(kind: BackoffKind, attempt: u32, base: Duration, max: Duration) -> Duration {
    match kind {
        BackoffKind::Fixed => base,
        BackoffKind::Exponential => {
            calculate_backoff(attempt, base.as_millis() as u64, max.as_millis() as u64)
        }
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    // Apply jitter (0 to 10% of the delay), never past the cap
    let jitter_range = delay_ms.min(max_ms) / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms.saturating_add(jitter).min(max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() < 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200 && b2.as_millis() < 220);

        let max = calculate_backoff(10, 100, 1000);
        assert_eq!(max.as_millis(), 1000);
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let d = calculate_backoff(200, 1000, 30_000);
        assert_eq!(d, Duration::from_secs(30));
    }

    #[test]
    fn test_fixed_delay_ignores_attempt() {
        let base = Duration::from_millis(500);
        let max = Duration::from_secs(10);
        for attempt in 1..5 {
            assert_eq!(retry_delay(BackoffKind::Fixed, attempt, base, max), base);
        }
    }

    #[test]
    fn test_exponential_delay_grows() {
        let base = Duration::from_millis(100);
        let max = Duration::from_secs(10);
        let third = retry_delay(BackoffKind::Exponential, 3, base, max);
        assert!(third >= Duration::from_millis(400));
    }
}
