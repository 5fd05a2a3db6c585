//! Order number generation.
//!
//! Order numbers are `ORD-` followed by the last eight digits of the
//! millisecond timestamp. Within one process they strictly increase: a second
//! order in the same millisecond takes the next millisecond's number. Across
//! processes collisions remain possible and are caught by the unique
//! constraint on `orders.order_number`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

const ORDER_NUMBER_MODULUS: u64 = 100_000_000;

/// Hands out monotonically increasing timestamp-derived order numbers.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    last_millis: AtomicU64,
}

impl OrderNumberGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicU64::new(0),
        }
    }

    /// Order number for the current time.
    pub fn next(&self) -> String {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        self.next_at(now)
    }

    /// Order number for `now_millis`, bumped past the last one issued.
    pub fn next_at(&self, now_millis: u64) -> String {
        let mut previous = self.last_millis.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(previous + 1);
            match self.last_millis.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return format_order_number(candidate),
                Err(actual) => previous = actual,
            }
        }
    }
}

/// `ORD-` plus the last eight digits of `millis`, zero-padded.
#[must_use]
pub fn format_order_number(millis: u64) -> String {
    format!("ORD-{:08}", millis % ORDER_NUMBER_MODULUS)
}

/// Whether `s` has the `ORD-dddddddd` shape.
#[must_use]
pub fn is_order_number(s: &str) -> bool {
    s.strip_prefix("ORD-")
        .is_some_and(|digits| digits.len() == 8 && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_format_keeps_last_eight_digits() {
        assert_eq!(format_order_number(1_700_000_123_456), "ORD-00123456");
        assert_eq!(format_order_number(42), "ORD-00000042");
    }

    #[test]
    fn test_same_millisecond_bumps() {
        let generator = OrderNumberGenerator::new();
        assert_eq!(generator.next_at(1_000), "ORD-00001000");
        assert_eq!(generator.next_at(1_000), "ORD-00001001");
        assert_eq!(generator.next_at(999), "ORD-00001002");
        assert_eq!(generator.next_at(5_000), "ORD-00005000");
    }

    #[test]
    fn test_current_time_shape() {
        assert!(is_order_number(&OrderNumberGenerator::new().next()));
        assert!(!is_order_number("ORD-1234567"));
        assert!(!is_order_number("ORD-1234567a"));
        assert!(!is_order_number("INV-12345678"));
    }

    #[test]
    fn test_unique_across_threads() {
        let generator = Arc::new(OrderNumberGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..250).map(|_| generator.next_at(7)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap_or_default() {
                assert!(seen.insert(number));
            }
        }
        assert_eq!(seen.len(), 1_000);
    }
}
