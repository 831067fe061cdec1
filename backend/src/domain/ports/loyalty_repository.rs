//! Driven port for loyalty ledger persistence.
//!
//! Every balance or tier change is written through [`LoyaltyRepository::commit`],
//! which stores the updated account row and its transactions atomically. The
//! account row carries a revision; a commit only applies when the stored
//! revision still equals [`LedgerCommit::expected_revision`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LoyaltyAccount, LoyaltyTransaction, TierDistribution, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by loyalty ledger adapters.
    pub enum LoyaltyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "loyalty repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "loyalty repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Default number of history entries per page.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
/// Largest page a caller may request.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Newest-first window over an account's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPage {
    limit: u32,
    offset: u32,
}

impl HistoryPage {
    /// Build a page, applying the default limit and capping at the maximum.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .clamp(1, MAX_HISTORY_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// Maximum number of entries returned.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Entries skipped from the newest.
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Atomic unit of ledger change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCommit {
    /// Account state after the change, with its revision already advanced.
    pub account: LoyaltyAccount,
    /// `None` to create the account, `Some(n)` to update revision `n`.
    pub expected_revision: Option<u32>,
    /// Transactions appended alongside the account change.
    pub transactions: Vec<LoyaltyTransaction>,
}

/// Port for ledger storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltyRepository: Send + Sync {
    /// Fetch the account for `user_id`, `None` if it was never written.
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LoyaltyAccount>, LoyaltyRepositoryError>;

    /// Apply `commit` atomically.
    ///
    /// Returns [`LoyaltyRepositoryError::RevisionMismatch`] when the stored
    /// revision differs from `expected_revision`, including when an account
    /// being created already exists. Nothing is written in that case.
    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LoyaltyRepositoryError>;

    /// Append one transaction without touching the account row.
    async fn append_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), LoyaltyRepositoryError>;

    /// List transactions for `user_id`, newest first.
    async fn list_transactions(
        &self,
        user_id: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<LoyaltyTransaction>, LoyaltyRepositoryError>;

    /// Count accounts per tier.
    async fn tier_distribution(&self) -> Result<TierDistribution, LoyaltyRepositoryError>;
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<UserId, LoyaltyAccount>,
    transactions: Vec<LoyaltyTransaction>,
}

/// Process-local ledger used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryLoyaltyRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLoyaltyRepository {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoyaltyRepository for InMemoryLoyaltyRepository {
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LoyaltyAccount>, LoyaltyRepositoryError> {
        Ok(self.state.lock().await.accounts.get(user_id).cloned())
    }

    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LoyaltyRepositoryError> {
        let mut state = self.state.lock().await;
        let stored = state
            .accounts
            .get(&commit.account.user_id)
            .map(|account| account.revision);
        match (stored, commit.expected_revision) {
            (None, None) => {}
            (Some(actual), Some(expected)) if actual == expected => {}
            (stored, expected) => {
                return Err(LoyaltyRepositoryError::revision_mismatch(
                    expected.unwrap_or(0),
                    stored.unwrap_or(0),
                ));
            }
        }
        state
            .accounts
            .insert(commit.account.user_id, commit.account.clone());
        state.transactions.extend(commit.transactions.iter().cloned());
        Ok(())
    }

    async fn append_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), LoyaltyRepositoryError> {
        self.state
            .lock()
            .await
            .transactions
            .push(transaction.clone());
        Ok(())
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<LoyaltyTransaction>, LoyaltyRepositoryError> {
        let state = self.state.lock().await;
        let mut matching: Vec<_> = state
            .transactions
            .iter()
            .enumerate()
            .filter(|(_, tx)| tx.user_id == *user_id)
            .collect();
        // Newest first; insertion order breaks timestamp ties.
        matching.sort_by(|(left_idx, left), (right_idx, right)| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right_idx.cmp(left_idx))
        });
        Ok(matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .map(|(_, tx)| tx.clone())
            .collect())
    }

    async fn tier_distribution(&self) -> Result<TierDistribution, LoyaltyRepositoryError> {
        let state = self.state.lock().await;
        let mut distribution = TierDistribution::default();
        for account in state.accounts.values() {
            distribution.add(account.status_tier, 1);
        }
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StatusTier, TransactionType};
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn transaction(user_id: UserId, minutes: i64, delta: i64) -> LoyaltyTransaction {
        LoyaltyTransaction {
            id: Uuid::new_v4(),
            user_id,
            transaction_type: TransactionType::Earned,
            points_delta: delta,
            description: format!("visit {minutes}"),
            booking_ref: None,
            created_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    fn commit_for(account: LoyaltyAccount, expected: Option<u32>) -> LedgerCommit {
        LedgerCommit {
            account,
            expected_revision: expected,
            transactions: Vec::new(),
        }
    }

    #[rstest]
    #[case(None, 20, 0)]
    #[case(Some(0), 1, 0)]
    #[case(Some(500), 100, 0)]
    #[case(Some(10), 10, 0)]
    fn history_page_applies_bounds(
        #[case] limit: Option<u32>,
        #[case] expected_limit: u32,
        #[case] expected_offset: u32,
    ) {
        let page = HistoryPage::new(limit, None);
        assert_eq!(page.limit(), expected_limit);
        assert_eq!(page.offset(), expected_offset);
    }

    #[tokio::test]
    async fn commit_creates_then_requires_matching_revision() {
        let repo = InMemoryLoyaltyRepository::new();
        let user_id = UserId::random();
        let mut account = LoyaltyAccount::opened(user_id, Utc::now());
        account.revision = 1;

        repo.commit(&commit_for(account.clone(), None))
            .await
            .expect("create succeeds");

        let duplicate = repo.commit(&commit_for(account.clone(), None)).await;
        assert_eq!(
            duplicate,
            Err(LoyaltyRepositoryError::revision_mismatch(0_u32, 1_u32))
        );

        account.revision = 2;
        repo.commit(&commit_for(account.clone(), Some(1)))
            .await
            .expect("update at matching revision succeeds");
        let stale = repo.commit(&commit_for(account, Some(1))).await;
        assert!(matches!(
            stale,
            Err(LoyaltyRepositoryError::RevisionMismatch { expected: 1, actual: 2 })
        ));
    }

    #[tokio::test]
    async fn rejected_commit_writes_no_transactions() {
        let repo = InMemoryLoyaltyRepository::new();
        let user_id = UserId::random();
        let mut account = LoyaltyAccount::opened(user_id, Utc::now());
        account.revision = 1;
        let commit = LedgerCommit {
            account,
            expected_revision: Some(4),
            transactions: vec![transaction(user_id, 0, 10)],
        };

        assert!(repo.commit(&commit).await.is_err());
        let history = repo
            .list_transactions(&user_id, HistoryPage::default())
            .await
            .expect("history loads");
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first_and_paged() {
        let repo = InMemoryLoyaltyRepository::new();
        let user_id = UserId::random();
        for minutes in 0..5 {
            repo.append_transaction(&transaction(user_id, minutes, minutes))
                .await
                .expect("append succeeds");
        }
        repo.append_transaction(&transaction(UserId::random(), 10, 99))
            .await
            .expect("append succeeds");

        let page = repo
            .list_transactions(&user_id, HistoryPage::new(Some(2), Some(1)))
            .await
            .expect("history loads");
        let deltas: Vec<_> = page.iter().map(|tx| tx.points_delta).collect();
        assert_eq!(deltas, vec![3, 2]);
    }

    #[tokio::test]
    async fn distribution_counts_accounts() {
        let repo = InMemoryLoyaltyRepository::new();
        for tier in [StatusTier::Silver, StatusTier::Gold, StatusTier::Gold] {
            let mut account = LoyaltyAccount::opened(UserId::random(), Utc::now());
            account.status_tier = tier;
            account.revision = 1;
            repo.commit(&commit_for(account, None))
                .await
                .expect("create succeeds");
        }
        let distribution = repo.tier_distribution().await.expect("counts load");
        assert_eq!(distribution.gold, 2);
        assert_eq!(distribution.total_members(), 3);
    }
}
