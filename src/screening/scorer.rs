//! Severity banding for PHQ-9 totals.

/// Map a PHQ-9 total (0-27) to a 1..=5 severity level.
///
/// 1: Minimal (0-4), 2: Mild (5-9), 3: Moderate (10-14),
/// 4: Moderately severe (15-19), 5: Severe (20-27).
pub const fn score_to_level(total: u8) -> u8 {
    if total <= 4 {
        1
    } else if total <= 9 {
        2
    } else if total <= 14 {
        3
    } else if total <= 19 {
        4
    } else {
        5
    }
}

/// Human-readable name for a severity level.
pub const fn level_label(level: u8) -> &'static str {
    match level {
        1 => "Minimal",
        2 => "Mild",
        3 => "Moderate",
        4 => "Moderately severe",
        5 => "Severe / High risk",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banding_boundaries_match_phq9_convention() {
        assert_eq!(score_to_level(0), 1);
        assert_eq!(score_to_level(4), 1);
        assert_eq!(score_to_level(5), 2);
        assert_eq!(score_to_level(9), 2);
        assert_eq!(score_to_level(10), 3);
        assert_eq!(score_to_level(14), 3);
        assert_eq!(score_to_level(15), 4);
        assert_eq!(score_to_level(19), 4);
        assert_eq!(score_to_level(20), 5);
        assert_eq!(score_to_level(27), 5);
    }

    #[test]
    fn levels_are_monotonic_over_the_full_range() {
        let mut previous = score_to_level(0);
        for total in 1..=27u8 {
            let level = score_to_level(total);
            assert!(level >= previous, "level dropped at total {total}");
            assert!((1..=5).contains(&level));
            previous = level;
        }
    }

    #[test]
    fn labels_round_trip_and_reject_unknown_levels() {
        assert_eq!(level_label(1), "Minimal");
        assert_eq!(level_label(2), "Mild");
        assert_eq!(level_label(3), "Moderate");
        assert_eq!(level_label(4), "Moderately severe");
        assert_eq!(level_label(5), "Severe / High risk");
        assert_eq!(level_label(0), "Unknown");
        assert_eq!(level_label(6), "Unknown");
    }

    #[test]
    fn scoring_is_a_pure_function() {
        for total in 0..=27u8 {
            let first = score_to_level(total);
            let second = score_to_level(total);
            assert_eq!(first, second);
            assert_eq!(level_label(first), level_label(second));
        }
    }
}
