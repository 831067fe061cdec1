//! Penalty assessment for booking violations.

use super::{LoyaltySettings, PenaltyType};

const DEFAULT_PENALTY_REASON: &str = "Booking violation";

/// Outcome of applying a penalty to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyAssessment {
    /// Magnitude configured for the penalty type.
    pub configured: u32,
    /// Points actually removed; less than `configured` when the balance ran out.
    pub deducted: u32,
    /// Balance after the deduction, never below zero.
    pub new_balance: u32,
}

/// Deduct the configured penalty from `balance`, clamping at zero.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::{LoyaltySettings, PenaltyType, assess_penalty};
///
/// let outcome = assess_penalty(40, PenaltyType::NoShow, &LoyaltySettings::default());
/// assert_eq!(outcome.new_balance, 0);
/// assert_eq!(outcome.deducted, 40);
/// assert_eq!(outcome.configured, 50);
/// ```
pub fn assess_penalty(
    balance: u32,
    penalty: PenaltyType,
    settings: &LoyaltySettings,
) -> PenaltyAssessment {
    let configured = settings.penalty_for(penalty);
    let new_balance = balance.saturating_sub(configured);
    PenaltyAssessment {
        configured,
        deducted: balance - new_balance,
        new_balance,
    }
}

/// Ledger description such as `"no show penalty (Booking violation)"`.
pub fn penalty_description(penalty: PenaltyType, reason: Option<&str>) -> String {
    let label = penalty.as_str().replace('_', " ");
    let reason = reason
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_PENALTY_REASON);
    format!("{label} penalty ({reason})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::clamped(40, PenaltyType::NoShow, 0, 40)]
    #[case::exact(50, PenaltyType::NoShow, 0, 50)]
    #[case::partial(100, PenaltyType::LateCancellation, 75, 25)]
    #[case::empty(0, PenaltyType::LateCancellation, 0, 0)]
    fn deduction_never_goes_negative(
        #[case] balance: u32,
        #[case] penalty: PenaltyType,
        #[case] new_balance: u32,
        #[case] deducted: u32,
    ) {
        let outcome = assess_penalty(balance, penalty, &LoyaltySettings::default());
        assert_eq!(outcome.new_balance, new_balance);
        assert_eq!(outcome.deducted, deducted);
    }

    #[rstest]
    #[case(PenaltyType::LateCancellation, Some("Cancelled 1h before"), "late cancellation penalty (Cancelled 1h before)")]
    #[case(PenaltyType::NoShow, None, "no show penalty (Booking violation)")]
    #[case(PenaltyType::NoShow, Some("  "), "no show penalty (Booking violation)")]
    fn descriptions(
        #[case] penalty: PenaltyType,
        #[case] reason: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(penalty_description(penalty, reason), expected);
    }
}
