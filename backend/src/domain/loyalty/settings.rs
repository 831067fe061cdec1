//! Administrator-tunable loyalty programme parameters.

use serde::{Deserialize, Serialize};

use super::{MAX_LEDGER_COUNTER, PenaltyType, StatusTier};

/// Singleton programme configuration.
///
/// Field names are snake_case on the wire to match the stored row.
///
/// ## Invariants
/// - `0 < silver_threshold < gold_threshold < platinum_threshold`.
/// - Service rates are finite and non-negative.
/// - Thresholds and penalties do not exceed [`MAX_LEDGER_COUNTER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoyaltySettings {
    /// Points per currency unit earned at Silver.
    pub service_rate_silver: f64,
    /// Points per currency unit earned at Gold.
    pub service_rate_gold: f64,
    /// Points per currency unit earned at Platinum.
    pub service_rate_platinum: f64,
    /// Visits marking full Silver progress.
    pub silver_threshold: u32,
    /// Visits required for Gold.
    pub gold_threshold: u32,
    /// Visits required for Platinum.
    pub platinum_threshold: u32,
    /// Points deducted for a late cancellation.
    pub late_cancellation_penalty: u32,
    /// Points deducted for a no-show.
    pub no_show_penalty: u32,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        Self {
            service_rate_silver: 5.0,
            service_rate_gold: 10.0,
            service_rate_platinum: 15.0,
            silver_threshold: 5,
            gold_threshold: 10,
            platinum_threshold: 20,
            late_cancellation_penalty: 25,
            no_show_penalty: 50,
        }
    }
}

/// Reasons a settings value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsValidationError {
    /// A threshold was zero.
    #[error("{field} must be greater than zero")]
    ThresholdNotPositive {
        /// Offending field.
        field: &'static str,
    },
    /// Thresholds were not strictly increasing.
    #[error("thresholds must satisfy silver_threshold < gold_threshold < platinum_threshold")]
    ThresholdsNotIncreasing,
    /// A threshold or penalty does not fit the ledger's counter range.
    #[error("{field} must not exceed 2147483647")]
    CounterOutOfRange {
        /// Offending field.
        field: &'static str,
    },
    /// A rate was negative, NaN, or infinite.
    #[error("{field} must be a finite, non-negative number")]
    InvalidRate {
        /// Offending field.
        field: &'static str,
    },
}

impl LoyaltySettings {
    /// Earning rate for `tier`.
    pub fn rate_for(&self, tier: StatusTier) -> f64 {
        match tier {
            StatusTier::Silver => self.service_rate_silver,
            StatusTier::Gold => self.service_rate_gold,
            StatusTier::Platinum => self.service_rate_platinum,
        }
    }

    /// Configured deduction for `penalty`.
    pub fn penalty_for(&self, penalty: PenaltyType) -> u32 {
        match penalty {
            PenaltyType::LateCancellation => self.late_cancellation_penalty,
            PenaltyType::NoShow => self.no_show_penalty,
        }
    }

    /// Check the invariants listed on the type.
    pub fn validate(&self) -> Result<(), SettingsValidationError> {
        for (field, rate) in [
            ("service_rate_silver", self.service_rate_silver),
            ("service_rate_gold", self.service_rate_gold),
            ("service_rate_platinum", self.service_rate_platinum),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SettingsValidationError::InvalidRate { field });
            }
        }
        for (field, threshold) in [
            ("silver_threshold", self.silver_threshold),
            ("gold_threshold", self.gold_threshold),
            ("platinum_threshold", self.platinum_threshold),
        ] {
            if threshold == 0 {
                return Err(SettingsValidationError::ThresholdNotPositive { field });
            }
        }
        for (field, counter) in [
            ("silver_threshold", self.silver_threshold),
            ("gold_threshold", self.gold_threshold),
            ("platinum_threshold", self.platinum_threshold),
            ("late_cancellation_penalty", self.late_cancellation_penalty),
            ("no_show_penalty", self.no_show_penalty),
        ] {
            if counter > MAX_LEDGER_COUNTER {
                return Err(SettingsValidationError::CounterOutOfRange { field });
            }
        }
        if self.silver_threshold >= self.gold_threshold
            || self.gold_threshold >= self.platinum_threshold
        {
            return Err(SettingsValidationError::ThresholdsNotIncreasing);
        }
        Ok(())
    }
}

/// Partial settings change. `None` leaves the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoyaltySettingsUpdate {
    /// New Silver rate.
    pub service_rate_silver: Option<f64>,
    /// New Gold rate.
    pub service_rate_gold: Option<f64>,
    /// New Platinum rate.
    pub service_rate_platinum: Option<f64>,
    /// New Silver threshold.
    pub silver_threshold: Option<u32>,
    /// New Gold threshold.
    pub gold_threshold: Option<u32>,
    /// New Platinum threshold.
    pub platinum_threshold: Option<u32>,
    /// New late-cancellation penalty.
    pub late_cancellation_penalty: Option<u32>,
    /// New no-show penalty.
    pub no_show_penalty: Option<u32>,
}

impl LoyaltySettingsUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay this update on `current`.
    ///
    /// # Examples
    /// ```
    /// use barbershop_backend::domain::{LoyaltySettings, LoyaltySettingsUpdate};
    ///
    /// let update = LoyaltySettingsUpdate { no_show_penalty: Some(75), ..Default::default() };
    /// let merged = update.apply_to(&LoyaltySettings::default());
    /// assert_eq!(merged.no_show_penalty, 75);
    /// assert_eq!(merged.late_cancellation_penalty, 25);
    /// ```
    pub fn apply_to(&self, current: &LoyaltySettings) -> LoyaltySettings {
        LoyaltySettings {
            service_rate_silver: self.service_rate_silver.unwrap_or(current.service_rate_silver),
            service_rate_gold: self.service_rate_gold.unwrap_or(current.service_rate_gold),
            service_rate_platinum: self
                .service_rate_platinum
                .unwrap_or(current.service_rate_platinum),
            silver_threshold: self.silver_threshold.unwrap_or(current.silver_threshold),
            gold_threshold: self.gold_threshold.unwrap_or(current.gold_threshold),
            platinum_threshold: self.platinum_threshold.unwrap_or(current.platinum_threshold),
            late_cancellation_penalty: self
                .late_cancellation_penalty
                .unwrap_or(current.late_cancellation_penalty),
            no_show_penalty: self.no_show_penalty.unwrap_or(current.no_show_penalty),
        }
    }
}
