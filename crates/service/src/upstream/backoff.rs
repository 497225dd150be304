use std::time::{Duration, Instant};

fn as_millis_u64(duration: Duration) -> u64 {
    duration.as_millis().min(u64::MAX as u128) as u64
}

// 中文注释：退避表固定为 base * 2^attempt（attempt 从 0 起：1s、2s…），
// 不加抖动，单用户场景没有需要打散的并发重试波峰。
pub(super) fn exponential_delay(base: Duration, attempt: u32) -> Duration {
    let base_ms = as_millis_u64(base);
    if base_ms == 0 {
        return Duration::from_millis(0);
    }
    let multiplier = 1_u64 << attempt.min(10);
    Duration::from_millis(base_ms.saturating_mul(multiplier))
}

pub(super) fn wait_before_retry<W>(
    base: Duration,
    attempt: u32,
    deadline: Option<Instant>,
    wait: &mut W,
) -> bool
where
    W: FnMut(Duration),
{
    let delay = exponential_delay(base, attempt);
    let Some(delay) = super::deadline::cap_wait(delay, deadline) else {
        return false;
    };
    if !delay.is_zero() {
        wait(delay);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::exponential_delay;
    use std::time::Duration;

    #[test]
    fn delay_doubles_per_attempt_from_base() {
        let base = Duration::from_secs(1);
        assert_eq!(exponential_delay(base, 0), Duration::from_secs(1));
        assert_eq!(exponential_delay(base, 1), Duration::from_secs(2));
        assert_eq!(exponential_delay(base, 2), Duration::from_secs(4));
    }

    #[test]
    fn delay_shift_is_clamped_for_large_attempts() {
        let base = Duration::from_millis(1);
        assert_eq!(exponential_delay(base, 63), exponential_delay(base, 10));
        assert_eq!(exponential_delay(Duration::from_millis(0), 5), Duration::from_millis(0));
    }
}
