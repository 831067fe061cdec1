//! Driving port for read-only loyalty queries.

use async_trait::async_trait;

use crate::domain::{Error, LoyaltyStats, LoyaltyTransaction, TierDistribution, UserId};

use super::HistoryPage;

/// Read-only loyalty queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyQuery: Send + Sync {
    /// Balance, tier and tier progress for `user_id`.
    ///
    /// Users without an account see a fresh Silver snapshot.
    async fn stats(&self, user_id: &UserId) -> Result<LoyaltyStats, Error>;

    /// Transactions for `user_id`, newest first.
    async fn history(
        &self,
        user_id: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<LoyaltyTransaction>, Error>;

    /// Member counts per tier.
    async fn tier_distribution(&self) -> Result<TierDistribution, Error>;
}
