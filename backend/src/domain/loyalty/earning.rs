//! Points earned for a confirmed visit.

use super::{LoyaltySettings, StatusTier};

/// Points earned for a visit paid `amount_paid_minor` (in minor currency
/// units), at the rate configured for `tier`.
///
/// Rates are points per whole currency unit; fractional points are dropped.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::{LoyaltySettings, StatusTier, points_for_visit};
///
/// // 25.00 at the default Gold rate of 10 points per unit.
/// assert_eq!(points_for_visit(2_500, StatusTier::Gold, &LoyaltySettings::default()), 250);
/// ```
pub fn points_for_visit(amount_paid_minor: u64, tier: StatusTier, settings: &LoyaltySettings) -> u32 {
    let rate = settings.rate_for(tier);
    if !rate.is_finite() || rate <= 0.0 {
        return 0;
    }
    let points = (amount_paid_minor as f64 * rate / 100.0).floor();
    if points >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        points as u32
    }
}
