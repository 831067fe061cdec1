//! Request and response payloads for the loyalty endpoints.
//!
//! Customer-facing payloads are camelCase. Settings payloads keep the
//! snake_case field names of the stored settings row.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{PenaltyOutcome, RedemptionOutcome, TierCheckOutcome, VisitOutcome};
use crate::domain::{
    LoyaltySettings, LoyaltySettingsUpdate, LoyaltyStats, LoyaltyTransaction, StatusTier,
    TierDistribution,
};

/// Label used for `nextTier` once the top tier is reached.
pub const MAX_TIER_LABEL: &str = "Max";

/// Body of `POST /loyalty/penalties`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Option<String>,
    #[schema(example = "no_show")]
    pub penalty_type: Option<String>,
    pub booking_id: Option<String>,
    pub reason: Option<String>,
}

/// Result of `POST /loyalty/penalties`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyResponse {
    pub success: bool,
    /// Configured magnitude of the penalty.
    pub penalty_applied: u32,
    /// Points actually removed after clamping the balance at zero.
    pub points_deducted: u32,
    pub new_point_balance: u32,
    pub penalty_type: String,
}

impl From<PenaltyOutcome> for PenaltyResponse {
    fn from(value: PenaltyOutcome) -> Self {
        Self {
            success: true,
            penalty_applied: value.penalty_applied,
            points_deducted: value.points_deducted,
            new_point_balance: value.new_point_balance,
            penalty_type: value.penalty_type.to_string(),
        }
    }
}

/// Result of `POST /loyalty/tier-check`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierCheckResponse {
    pub success: bool,
    #[schema(example = "Gold")]
    pub current_tier: String,
    pub tier_upgraded: bool,
    pub visit_count: u32,
}

impl From<TierCheckOutcome> for TierCheckResponse {
    fn from(value: TierCheckOutcome) -> Self {
        Self {
            success: true,
            current_tier: value.current_tier.to_string(),
            tier_upgraded: value.tier_upgraded,
            visit_count: value.visit_count,
        }
    }
}

/// Loyalty snapshot for the signed-in caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsPayload {
    pub total_confirmed_visits: u32,
    pub redeemable_points: u32,
    #[schema(example = "Silver")]
    pub status_tier: String,
    #[schema(minimum = 0, maximum = 100)]
    pub progress_to_next_tier: u8,
    /// Next tier name, or `Max` at Platinum.
    #[schema(example = "Gold")]
    pub next_tier: String,
}

impl From<LoyaltyStats> for StatsPayload {
    fn from(value: LoyaltyStats) -> Self {
        Self {
            total_confirmed_visits: value.total_confirmed_visits,
            redeemable_points: value.redeemable_points,
            status_tier: value.status_tier.to_string(),
            progress_to_next_tier: value.progress_to_next_tier,
            next_tier: value
                .next_tier
                .map_or_else(|| MAX_TIER_LABEL.to_owned(), |tier: StatusTier| tier.to_string()),
        }
    }
}

/// Result of `GET /loyalty/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: StatsPayload,
}

/// Paging parameters for `GET /loyalty/history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Entries per page, default 20, capped at 100.
    pub limit: Option<u32>,
    /// Entries skipped from the newest.
    pub offset: Option<u32>,
}

/// One ledger entry.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub id: String,
    pub user_id: String,
    #[schema(example = "EARNED")]
    pub transaction_type: String,
    pub points_delta: i64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<LoyaltyTransaction> for TransactionPayload {
    fn from(value: LoyaltyTransaction) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            transaction_type: value.transaction_type.to_string(),
            points_delta: value.points_delta,
            description: value.description,
            booking_id: value.booking_ref,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Result of `GET /loyalty/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub transactions: Vec<TransactionPayload>,
}

/// Body of `POST /loyalty/redemptions`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RedemptionRequest {
    #[schema(example = 50)]
    pub points: Option<i64>,
    pub description: Option<String>,
}

/// Result of `POST /loyalty/redemptions`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResponse {
    pub success: bool,
    pub points_redeemed: u32,
    pub new_point_balance: u32,
}

impl From<RedemptionOutcome> for RedemptionResponse {
    fn from(value: RedemptionOutcome) -> Self {
        Self {
            success: true,
            points_redeemed: value.points_redeemed,
            new_point_balance: value.new_point_balance,
        }
    }
}

/// Body of `POST /loyalty/visits`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub user_id: Option<String>,
    pub booking_id: Option<String>,
    /// Amount paid in minor currency units (pence, cents).
    #[schema(example = 2500)]
    pub amount_paid_minor: Option<u64>,
}

/// Result of `POST /loyalty/visits`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitResponse {
    pub success: bool,
    pub points_earned: u32,
    pub total_confirmed_visits: u32,
    pub new_point_balance: u32,
    pub current_tier: String,
    pub tier_upgraded: bool,
}

impl From<VisitOutcome> for VisitResponse {
    fn from(value: VisitOutcome) -> Self {
        Self {
            success: true,
            points_earned: value.points_earned,
            total_confirmed_visits: value.total_confirmed_visits,
            new_point_balance: value.new_point_balance,
            current_tier: value.current_tier.to_string(),
            tier_upgraded: value.tier_upgraded,
        }
    }
}

/// Body of `POST /admin/loyalty/transactions`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub user_id: Option<String>,
    #[schema(example = "EARNED")]
    pub transaction_type: Option<String>,
    pub points_delta: Option<i64>,
    pub description: Option<String>,
    pub booking_id: Option<String>,
}

/// Result of `POST /admin/loyalty/transactions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub success: bool,
    pub transaction: TransactionPayload,
}

/// Programme settings as exchanged with administrators.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SettingsPayload {
    pub service_rate_silver: f64,
    pub service_rate_gold: f64,
    pub service_rate_platinum: f64,
    pub silver_threshold: u32,
    pub gold_threshold: u32,
    pub platinum_threshold: u32,
    pub late_cancellation_penalty: u32,
    pub no_show_penalty: u32,
}

impl From<LoyaltySettings> for SettingsPayload {
    fn from(value: LoyaltySettings) -> Self {
        Self {
            service_rate_silver: value.service_rate_silver,
            service_rate_gold: value.service_rate_gold,
            service_rate_platinum: value.service_rate_platinum,
            silver_threshold: value.silver_threshold,
            gold_threshold: value.gold_threshold,
            platinum_threshold: value.platinum_threshold,
            late_cancellation_penalty: value.late_cancellation_penalty,
            no_show_penalty: value.no_show_penalty,
        }
    }
}

/// Result of the settings endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: SettingsPayload,
}

/// Body of `PATCH /admin/loyalty/settings`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatchRequest {
    pub service_rate_silver: Option<f64>,
    pub service_rate_gold: Option<f64>,
    pub service_rate_platinum: Option<f64>,
    pub silver_threshold: Option<u32>,
    pub gold_threshold: Option<u32>,
    pub platinum_threshold: Option<u32>,
    pub late_cancellation_penalty: Option<u32>,
    pub no_show_penalty: Option<u32>,
}

impl From<SettingsPatchRequest> for LoyaltySettingsUpdate {
    fn from(value: SettingsPatchRequest) -> Self {
        Self {
            service_rate_silver: value.service_rate_silver,
            service_rate_gold: value.service_rate_gold,
            service_rate_platinum: value.service_rate_platinum,
            silver_threshold: value.silver_threshold,
            gold_threshold: value.gold_threshold,
            platinum_threshold: value.platinum_threshold,
            late_cancellation_penalty: value.late_cancellation_penalty,
            no_show_penalty: value.no_show_penalty,
        }
    }
}

/// Member counts per tier, keyed by lower-case tier name.
#[derive(Debug, Serialize, ToSchema)]
pub struct TierDistributionPayload {
    pub silver: u64,
    pub gold: u64,
    pub platinum: u64,
}

/// Result of `GET /admin/loyalty/overview`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub success: bool,
    pub total_members: u64,
    pub tier_distribution: TierDistributionPayload,
}

impl From<TierDistribution> for OverviewResponse {
    fn from(value: TierDistribution) -> Self {
        Self {
            success: true,
            total_members: value.total_members(),
            tier_distribution: TierDistributionPayload {
                silver: value.silver,
                gold: value.gold,
                platinum: value.platinum,
            },
        }
    }
}
