//! Freshness policy: maximum cache age per interval before a refetch.
//! Shorter intervals demand fresher data. Pure, total, no side effects.

use crate::models::Interval;

pub fn staleness_threshold_ms(interval: Interval) -> i64 {
    match interval {
        Interval::M1 => 30_000,
        Interval::M5 => 60_000,
        Interval::M15 => 120_000,
        Interval::M30 => 300_000,
        Interval::H1 => 600_000,
        Interval::H4 => 1_800_000,
        Interval::D1 => 1_800_000,
        Interval::W1 => 3_600_000,
    }
}

pub fn is_fresh(interval: Interval, age_ms: i64) -> bool {
    age_ms < staleness_threshold_ms(interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_at_zero_stale_past_threshold() {
        for interval in Interval::ALL {
            assert!(is_fresh(interval, 0), "{interval} should be fresh at age 0");
            assert!(
                !is_fresh(interval, staleness_threshold_ms(interval) + 1),
                "{interval} should be stale past its threshold"
            );
        }
    }

    #[test]
    fn thresholds_span_30s_to_1h() {
        assert_eq!(staleness_threshold_ms(Interval::M1), 30_000);
        assert_eq!(staleness_threshold_ms(Interval::W1), 3_600_000);
    }
}
