//! Driving port for loyalty ledger mutations.
//!
//! Every operation loads the current settings, plans the change against the
//! account, and commits account and transactions together.

use async_trait::async_trait;

use crate::domain::{
    Error, LoyaltyTransaction, PenaltyType, StatusTier, TransactionType, UserId,
};

/// Request to penalise a booking violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyPenaltyRequest {
    /// Penalised customer.
    pub user_id: UserId,
    /// Violation category.
    pub penalty_type: PenaltyType,
    /// Booking that triggered the penalty.
    pub booking_ref: Option<String>,
    /// Free-text reason recorded in the description.
    pub reason: Option<String>,
}

/// Result of a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// Magnitude configured for the penalty type.
    pub penalty_applied: u32,
    /// Points actually removed after clamping at zero.
    pub points_deducted: u32,
    /// Balance after the penalty.
    pub new_point_balance: u32,
    /// Violation category.
    pub penalty_type: PenaltyType,
}

/// Result of a tier evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCheckOutcome {
    /// Tier after evaluation.
    pub current_tier: StatusTier,
    /// Whether the evaluation moved the account up a tier.
    pub tier_upgraded: bool,
    /// Confirmed visits used for the evaluation.
    pub visit_count: u32,
}

/// Request to record a confirmed visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordVisitRequest {
    /// Customer who attended.
    pub user_id: UserId,
    /// Confirmed booking.
    pub booking_ref: Option<String>,
    /// Amount paid in minor currency units.
    pub amount_paid_minor: u64,
}

/// Result of recording a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    /// Points earned for the visit.
    pub points_earned: u32,
    /// Visit count after the visit.
    pub total_confirmed_visits: u32,
    /// Balance after earning.
    pub new_point_balance: u32,
    /// Tier after the post-visit evaluation.
    pub current_tier: StatusTier,
    /// Whether the visit triggered an upgrade.
    pub tier_upgraded: bool,
}

/// Request to spend points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemPointsRequest {
    /// Account holder.
    pub user_id: UserId,
    /// Points to spend; must be positive and within the balance.
    pub points: u32,
    /// Optional description; defaults to a generic redemption note.
    pub description: Option<String>,
}

/// Result of a redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionOutcome {
    /// Points spent.
    pub points_redeemed: u32,
    /// Balance afterwards.
    pub new_point_balance: u32,
}

/// Request to append a raw ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTransactionRequest {
    /// Account owner.
    pub user_id: UserId,
    /// Entry kind.
    pub transaction_type: TransactionType,
    /// Signed point change.
    pub points_delta: i64,
    /// Description; must not be blank.
    pub description: String,
    /// Related booking.
    pub booking_ref: Option<String>,
}

/// Ledger mutations available to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyCommand: Send + Sync {
    /// Deduct the configured penalty, clamping the balance at zero.
    ///
    /// # Errors
    /// `not_found` when the customer has no loyalty account.
    async fn apply_penalty(&self, request: ApplyPenaltyRequest) -> Result<PenaltyOutcome, Error>;

    /// Evaluate one upgrade step for `user_id`.
    async fn check_and_upgrade_tier(&self, user_id: &UserId) -> Result<TierCheckOutcome, Error>;

    /// Count a visit, earn points, and evaluate one upgrade step.
    async fn record_confirmed_visit(
        &self,
        request: RecordVisitRequest,
    ) -> Result<VisitOutcome, Error>;

    /// Spend points from the balance.
    ///
    /// # Errors
    /// `invalid_request` when `points` is zero or exceeds the balance.
    async fn redeem_points(&self, request: RedeemPointsRequest)
    -> Result<RedemptionOutcome, Error>;

    /// Append a ledger entry without touching the cached balance or tier.
    async fn record_transaction(
        &self,
        request: RecordTransactionRequest,
    ) -> Result<LoyaltyTransaction, Error>;
}
