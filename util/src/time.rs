//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Milliseconds elapsed between two readings of a wrapping 32 bit millisecond
/// counter.
///
/// The subtraction wraps, so the result stays correct across a single counter
/// overflow between `since` and `now`.
pub fn elapsed_millis(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
        assert_eq!(duration_to_seconds(chrono::Duration::zero()), Some(0.0));
        assert_eq!(duration_to_seconds(chrono::Duration::max_value()), None);
    }

    #[test]
    fn test_elapsed_millis_wraps() {
        assert_eq!(elapsed_millis(150, 100), 50);
        assert_eq!(elapsed_millis(10, u32::MAX - 9), 20);
        assert_eq!(elapsed_millis(0, u32::MAX), 1);
        assert_eq!(elapsed_millis(7, 7), 0);
    }
}
