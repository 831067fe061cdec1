//! Tier upgrade rules and progress reporting.
//!
//! Upgrades move one step per evaluation: Silver to Gold once visits reach
//! `gold_threshold`, Gold to Platinum once they reach `platinum_threshold`.
//! Tiers never move down.

use super::{LoyaltySettings, StatusTier};

/// Progress towards the next tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProgress {
    /// Percentage in `0..=100`.
    pub percent: u8,
    /// Next tier, `None` at Platinum.
    pub next_tier: Option<StatusTier>,
}

/// Tier after one upgrade evaluation, or `None` when no upgrade applies.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::{LoyaltySettings, StatusTier, tier_after_visits};
///
/// let settings = LoyaltySettings::default();
/// assert_eq!(tier_after_visits(StatusTier::Silver, 10, &settings), Some(StatusTier::Gold));
/// // A single evaluation never skips Gold.
/// assert_eq!(tier_after_visits(StatusTier::Silver, 25, &settings), Some(StatusTier::Gold));
/// ```
pub fn tier_after_visits(
    current: StatusTier,
    visits: u32,
    settings: &LoyaltySettings,
) -> Option<StatusTier> {
    match current {
        StatusTier::Silver if visits >= settings.gold_threshold => Some(StatusTier::Gold),
        StatusTier::Gold if visits >= settings.platinum_threshold => Some(StatusTier::Platinum),
        _ => None,
    }
}

/// Description attached to the zero-point upgrade transaction.
pub fn upgrade_message(tier: StatusTier, visits: u32) -> String {
    format!("Congratulations! You've been upgraded to {tier} status after {visits} visits.")
}

/// Percentage progress towards the next tier.
///
/// Silver progress is measured against `silver_threshold` while the upgrade
/// itself happens at `gold_threshold`, so a Silver member shows 100% from
/// `silver_threshold` visits onwards. Clients depend on these figures.
pub fn progress_to_next_tier(
    tier: StatusTier,
    visits: u32,
    settings: &LoyaltySettings,
) -> TierProgress {
    match tier {
        StatusTier::Silver => TierProgress {
            percent: rounded_percent(i64::from(visits), i64::from(settings.silver_threshold)),
            next_tier: Some(StatusTier::Gold),
        },
        StatusTier::Gold => TierProgress {
            percent: rounded_percent(
                i64::from(visits) - i64::from(settings.silver_threshold),
                i64::from(settings.gold_threshold) - i64::from(settings.silver_threshold),
            ),
            next_tier: Some(StatusTier::Platinum),
        },
        StatusTier::Platinum => TierProgress {
            percent: 100,
            next_tier: None,
        },
    }
}

/// `round(numerator / denominator * 100)` with halves rounded up, clamped to
/// `0..=100`. A non-positive denominator counts as complete.
fn rounded_percent(numerator: i64, denominator: i64) -> u8 {
    if denominator <= 0 {
        return 100;
    }
    if numerator <= 0 {
        return 0;
    }
    let scaled = numerator.saturating_mul(100);
    let rounded = (scaled.saturating_mul(2) + denominator) / (denominator * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn settings() -> LoyaltySettings {
        LoyaltySettings::default()
    }

    #[rstest]
    #[case::below_gold(StatusTier::Silver, 9, None)]
    #[case::at_gold(StatusTier::Silver, 10, Some(StatusTier::Gold))]
    #[case::past_platinum_from_silver(StatusTier::Silver, 30, Some(StatusTier::Gold))]
    #[case::gold_below_platinum(StatusTier::Gold, 19, None)]
    #[case::at_platinum(StatusTier::Gold, 20, Some(StatusTier::Platinum))]
    #[case::terminal(StatusTier::Platinum, 500, None)]
    fn upgrade_rules(
        settings: LoyaltySettings,
        #[case] tier: StatusTier,
        #[case] visits: u32,
        #[case] expected: Option<StatusTier>,
    ) {
        assert_eq!(tier_after_visits(tier, visits, &settings), expected);
    }

    #[rstest]
    fn gold_member_below_gold_threshold_is_not_downgraded(settings: LoyaltySettings) {
        assert_eq!(tier_after_visits(StatusTier::Gold, 0, &settings), None);
    }

    #[rstest]
    #[case::zero(StatusTier::Silver, 0, 0)]
    #[case::partial(StatusTier::Silver, 2, 40)]
    #[case::at_silver_threshold(StatusTier::Silver, 5, 100)]
    #[case::clamped(StatusTier::Silver, 9, 100)]
    #[case::gold_start(StatusTier::Gold, 10, 100)]
    #[case::gold_below_silver(StatusTier::Gold, 3, 0)]
    #[case::gold_mid(StatusTier::Gold, 7, 40)]
    #[case::platinum(StatusTier::Platinum, 40, 100)]
    fn progress_figures(
        settings: LoyaltySettings,
        #[case] tier: StatusTier,
        #[case] visits: u32,
        #[case] expected: u8,
    ) {
        assert_eq!(progress_to_next_tier(tier, visits, &settings).percent, expected);
    }

    #[rstest]
    fn progress_rounds_half_up() {
        let settings = LoyaltySettings {
            silver_threshold: 8,
            ..LoyaltySettings::default()
        };
        // 1 / 8 = 12.5%
        assert_eq!(
            progress_to_next_tier(StatusTier::Silver, 1, &settings).percent,
            13
        );
    }

    #[rstest]
    #[case(StatusTier::Silver, Some(StatusTier::Gold))]
    #[case(StatusTier::Gold, Some(StatusTier::Platinum))]
    #[case(StatusTier::Platinum, None)]
    fn next_tier_labels(
        settings: LoyaltySettings,
        #[case] tier: StatusTier,
        #[case] expected: Option<StatusTier>,
    ) {
        assert_eq!(progress_to_next_tier(tier, 0, &settings).next_tier, expected);
    }

    #[rstest]
    fn upgrade_message_names_tier_and_visits() {
        assert_eq!(
            upgrade_message(StatusTier::Gold, 10),
            "Congratulations! You've been upgraded to Gold status after 10 visits."
        );
    }
}
