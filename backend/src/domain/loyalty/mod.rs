//! Loyalty ledger aggregates.
//!
//! Each customer owns one [`LoyaltyAccount`] caching their visit count, point
//! balance and tier. Every change to that cache is accompanied by one or more
//! append-only [`LoyaltyTransaction`] records written in the same commit.

mod earning;
mod penalty;
mod settings;
mod tier;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

pub use earning::points_for_visit;
pub use penalty::{PenaltyAssessment, assess_penalty, penalty_description};
pub use settings::{LoyaltySettings, LoyaltySettingsUpdate, SettingsValidationError};
pub use tier::{TierProgress, progress_to_next_tier, tier_after_visits, upgrade_message};

/// Membership tier. Ordered `Silver < Gold < Platinum`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum StatusTier {
    /// Entry tier for every new account.
    #[default]
    Silver,
    /// Middle tier.
    Gold,
    /// Terminal tier.
    Platinum,
}

impl StatusTier {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }

    /// The tier one step above, or `None` at Platinum.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => None,
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when stored or submitted enum text is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// Offending text.
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

impl FromStr for StatusTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Silver" => Ok(Self::Silver),
            "Gold" => Ok(Self::Gold),
            "Platinum" => Ok(Self::Platinum),
            other => Err(UnknownVariant::new("status tier", other)),
        }
    }
}

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Points earned, including zero-point tier upgrade notices.
    Earned,
    /// Points deducted for a booking violation.
    Penalty,
    /// Points spent by the customer.
    Redeemed,
}

impl TransactionType {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earned => "EARNED",
            Self::Penalty => "PENALTY",
            Self::Redeemed => "REDEEMED",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EARNED" => Ok(Self::Earned),
            "PENALTY" => Ok(Self::Penalty),
            "REDEEMED" => Ok(Self::Redeemed),
            other => Err(UnknownVariant::new("transaction type", other)),
        }
    }
}

/// Booking violation categories that incur a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyType {
    /// Cancelled too close to the appointment.
    LateCancellation,
    /// Did not attend.
    NoShow,
}

impl PenaltyType {
    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LateCancellation => "late_cancellation",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for PenaltyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PenaltyType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "late_cancellation" => Ok(Self::LateCancellation),
            "no_show" => Ok(Self::NoShow),
            other => Err(UnknownVariant::new("penalty type", other)),
        }
    }
}

/// Largest counter the ledger stores: visit counts, point balances, settings
/// thresholds and penalties all live in signed 32-bit columns.
pub const MAX_LEDGER_COUNTER: u32 = 0x7fff_ffff;

/// Cached loyalty state for one user.
///
/// ## Invariants
/// - `total_confirmed_visits` never decreases.
/// - `redeemable_points` is unsigned and therefore never negative.
/// - Counters never exceed [`MAX_LEDGER_COUNTER`].
/// - `status_tier` only moves forward.
/// - `revision` is `0` for an account that has not been persisted yet and
///   increases by one with every committed change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyAccount {
    /// Owner of the account.
    pub user_id: UserId,
    /// Confirmed visits so far.
    pub total_confirmed_visits: u32,
    /// Spendable point balance.
    pub redeemable_points: u32,
    /// Current tier.
    pub status_tier: StatusTier,
    /// Optimistic concurrency revision.
    pub revision: u32,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    /// Fresh Silver account with no visits or points, not yet persisted.
    pub fn opened(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            total_confirmed_visits: 0,
            redeemable_points: 0,
            status_tier: StatusTier::Silver,
            revision: 0,
            updated_at: now,
        }
    }

    /// Whether the account exists in storage.
    pub fn is_persisted(&self) -> bool {
        self.revision > 0
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTransaction {
    /// Entry identifier.
    pub id: Uuid,
    /// Account owner.
    pub user_id: UserId,
    /// Entry kind.
    pub transaction_type: TransactionType,
    /// Signed change in points. Zero for tier upgrade notices.
    pub points_delta: i64,
    /// Human-readable description.
    pub description: String,
    /// Booking that triggered the entry, if any.
    pub booking_ref: Option<String>,
    /// Time of recording.
    pub created_at: DateTime<Utc>,
}

/// Snapshot returned by the stats query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyStats {
    /// Confirmed visits so far.
    pub total_confirmed_visits: u32,
    /// Spendable point balance.
    pub redeemable_points: u32,
    /// Current tier.
    pub status_tier: StatusTier,
    /// Progress percentage in `0..=100`.
    pub progress_to_next_tier: u8,
    /// Next tier, `None` once Platinum is reached.
    pub next_tier: Option<StatusTier>,
}

/// Member counts per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    /// Silver members.
    pub silver: u64,
    /// Gold members.
    pub gold: u64,
    /// Platinum members.
    pub platinum: u64,
}

impl TierDistribution {
    /// Sum of all tiers.
    pub fn total_members(&self) -> u64 {
        self.silver + self.gold + self.platinum
    }

    /// Increment the counter for `tier` by `count`.
    pub fn add(&mut self, tier: StatusTier, count: u64) {
        match tier {
            StatusTier::Silver => self.silver += count,
            StatusTier::Gold => self.gold += count,
            StatusTier::Platinum => self.platinum += count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn tiers_are_ordered() {
        assert!(StatusTier::Silver < StatusTier::Gold);
        assert!(StatusTier::Gold < StatusTier::Platinum);
        assert_eq!(StatusTier::Platinum.next(), None);
    }

    #[rstest]
    #[case(TransactionType::Earned, "\"EARNED\"")]
    #[case(TransactionType::Penalty, "\"PENALTY\"")]
    #[case(TransactionType::Redeemed, "\"REDEEMED\"")]
    fn transaction_types_serialise_upper_case(
        #[case] value: TransactionType,
        #[case] expected: &str,
    ) {
        assert_eq!(serde_json::to_string(&value).expect("serialise"), expected);
        assert_eq!(value.as_str().parse::<TransactionType>(), Ok(value));
    }

    #[rstest]
    #[case("late_cancellation", PenaltyType::LateCancellation)]
    #[case("no_show", PenaltyType::NoShow)]
    fn penalty_types_parse(#[case] raw: &str, #[case] expected: PenaltyType) {
        assert_eq!(raw.parse::<PenaltyType>(), Ok(expected));
    }

    #[rstest]
    fn unknown_penalty_type_is_rejected() {
        let err = "rudeness".parse::<PenaltyType>().expect_err("unknown type");
        assert_eq!(err.to_string(), "unrecognised penalty type: rudeness");
    }

    #[rstest]
    fn opened_account_is_unpersisted_silver() {
        let account = LoyaltyAccount::opened(UserId::random(), Utc::now());
        assert_eq!(account.status_tier, StatusTier::Silver);
        assert_eq!(account.redeemable_points, 0);
        assert!(!account.is_persisted());
    }

    #[rstest]
    fn distribution_totals_members() {
        let mut distribution = TierDistribution::default();
        distribution.add(StatusTier::Silver, 3);
        distribution.add(StatusTier::Gold, 2);
        distribution.add(StatusTier::Platinum, 1);
        assert_eq!(distribution.total_members(), 6);
    }
}
