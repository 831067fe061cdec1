//! PostgreSQL-backed `LoyaltyRepository` implementation using Diesel ORM.
//!
//! A commit runs in one database transaction: the account row is inserted or
//! updated under a revision check, then the ledger entries are appended. When
//! the revision check matches no row the transaction is rolled back and the
//! stored revision is reported as a mismatch.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{HistoryPage, LedgerCommit, LoyaltyRepository, LoyaltyRepositoryError};
use crate::domain::{
    LoyaltyAccount, LoyaltyTransaction, StatusTier, TierDistribution, TransactionType, UserId,
};

use super::diesel_basic_error_mapping::{
    counter_from_db, counter_to_db, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{
    LoyaltyAccountRow, LoyaltyAccountUpdate, LoyaltyTransactionRow, NewLoyaltyAccountRow,
    NewLoyaltyTransactionRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{loyalty_accounts, loyalty_transactions};

/// Diesel-backed implementation of the `LoyaltyRepository` port.
#[derive(Clone)]
pub struct DieselLoyaltyRepository {
    pool: DbPool,
}

impl DieselLoyaltyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LoyaltyRepositoryError {
    map_basic_pool_error(error, LoyaltyRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LoyaltyRepositoryError {
    map_basic_diesel_error(
        error,
        LoyaltyRepositoryError::query,
        LoyaltyRepositoryError::connection,
    )
}

/// Failure inside the commit transaction.
enum CommitError {
    Diesel(diesel::result::Error),
    Stale { actual: Option<u32> },
}

impl From<diesel::result::Error> for CommitError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn row_to_account(row: LoyaltyAccountRow) -> Result<LoyaltyAccount, LoyaltyRepositoryError> {
    let status_tier = StatusTier::from_str(&row.status_tier)
        .map_err(|err| LoyaltyRepositoryError::query(err.to_string()))?;
    Ok(LoyaltyAccount {
        user_id: UserId::from_uuid(row.user_id),
        total_confirmed_visits: counter_from_db(row.total_confirmed_visits),
        redeemable_points: counter_from_db(row.redeemable_points),
        status_tier,
        revision: counter_from_db(row.revision),
        updated_at: row.updated_at,
    })
}

fn row_to_transaction(
    row: LoyaltyTransactionRow,
) -> Result<LoyaltyTransaction, LoyaltyRepositoryError> {
    let transaction_type = TransactionType::from_str(&row.transaction_type)
        .map_err(|err| LoyaltyRepositoryError::query(err.to_string()))?;
    Ok(LoyaltyTransaction {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        transaction_type,
        points_delta: row.points_delta,
        description: row.description,
        booking_ref: row.booking_ref,
        created_at: row.created_at,
    })
}

fn transaction_row(transaction: &LoyaltyTransaction) -> NewLoyaltyTransactionRow<'_> {
    NewLoyaltyTransactionRow {
        id: transaction.id,
        user_id: *transaction.user_id.as_uuid(),
        transaction_type: transaction.transaction_type.as_str(),
        points_delta: transaction.points_delta,
        description: &transaction.description,
        booking_ref: transaction.booking_ref.as_deref(),
        created_at: transaction.created_at,
    }
}

#[async_trait]
impl LoyaltyRepository for DieselLoyaltyRepository {
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LoyaltyAccount>, LoyaltyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<LoyaltyAccountRow> = loyalty_accounts::table
            .filter(loyalty_accounts::user_id.eq(user_id.as_uuid()))
            .select(LoyaltyAccountRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn commit(&self, commit: &LedgerCommit) -> Result<(), LoyaltyRepositoryError> {
        let account = &commit.account;
        let user_id = *account.user_id.as_uuid();
        let expected_revision = commit.expected_revision;
        let entries: Vec<_> = commit.transactions.iter().map(transaction_row).collect();
        let column = |value: u32| counter_to_db(value, LoyaltyRepositoryError::query);
        let total_confirmed_visits = column(account.total_confirmed_visits)?;
        let redeemable_points = column(account.redeemable_points)?;
        let revision = column(account.revision)?;
        let expected_column = expected_revision.map(column).transpose()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let outcome = conn
            .transaction::<_, CommitError, _>(|conn| {
                async move {
                    let written = match expected_column {
                        None => {
                            let row = NewLoyaltyAccountRow {
                                user_id,
                                total_confirmed_visits,
                                redeemable_points,
                                status_tier: account.status_tier.as_str(),
                                revision,
                                updated_at: account.updated_at,
                            };
                            diesel::insert_into(loyalty_accounts::table)
                                .values(&row)
                                .on_conflict_do_nothing()
                                .execute(conn)
                                .await?
                        }
                        Some(expected) => {
                            let update = LoyaltyAccountUpdate {
                                total_confirmed_visits,
                                redeemable_points,
                                status_tier: account.status_tier.as_str(),
                                revision,
                                updated_at: account.updated_at,
                            };
                            diesel::update(loyalty_accounts::table)
                                .filter(
                                    loyalty_accounts::user_id
                                        .eq(user_id)
                                        .and(loyalty_accounts::revision.eq(expected)),
                                )
                                .set(&update)
                                .execute(conn)
                                .await?
                        }
                    };

                    if written == 0 {
                        let actual: Option<i32> = loyalty_accounts::table
                            .filter(loyalty_accounts::user_id.eq(user_id))
                            .select(loyalty_accounts::revision)
                            .first(conn)
                            .await
                            .optional()?;
                        return Err(CommitError::Stale {
                            actual: actual.map(counter_from_db),
                        });
                    }

                    if !entries.is_empty() {
                        diesel::insert_into(loyalty_transactions::table)
                            .values(&entries)
                            .execute(conn)
                            .await?;
                    }
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        outcome.map_err(|err| match err {
            CommitError::Diesel(error) => map_diesel_error(error),
            CommitError::Stale { actual } => LoyaltyRepositoryError::revision_mismatch(
                expected_revision.unwrap_or(0),
                actual.unwrap_or(0),
            ),
        })
    }

    async fn append_transaction(
        &self,
        transaction: &LoyaltyTransaction,
    ) -> Result<(), LoyaltyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(loyalty_transactions::table)
            .values(&transaction_row(transaction))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_transactions(
        &self,
        user_id: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<LoyaltyTransaction>, LoyaltyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LoyaltyTransactionRow> = loyalty_transactions::table
            .filter(loyalty_transactions::user_id.eq(user_id.as_uuid()))
            .order((
                loyalty_transactions::created_at.desc(),
                loyalty_transactions::id.desc(),
            ))
            .limit(i64::from(page.limit()))
            .offset(i64::from(page.offset()))
            .select(LoyaltyTransactionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_transaction).collect()
    }

    async fn tier_distribution(&self) -> Result<TierDistribution, LoyaltyRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts: Vec<(String, i64)> = loyalty_accounts::table
            .group_by(loyalty_accounts::status_tier)
            .select((loyalty_accounts::status_tier, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut distribution = TierDistribution::default();
        for (tier, count) in counts {
            match StatusTier::from_str(&tier) {
                Ok(tier) => distribution.add(tier, u64::try_from(count).unwrap_or(0)),
                Err(err) => warn!(error = %err, count, "skipping accounts with unknown tier"),
            }
        }
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and error mapping coverage.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn account_row(tier: &str) -> LoyaltyAccountRow {
        LoyaltyAccountRow {
            user_id: Uuid::new_v4(),
            total_confirmed_visits: 11,
            redeemable_points: 240,
            status_tier: tier.to_owned(),
            revision: 7,
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(err, LoyaltyRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, LoyaltyRepositoryError::Query { .. }));
    }

    #[rstest]
    fn account_row_converts_to_domain() {
        let row = account_row("Gold");
        let user = row.user_id;

        let account = row_to_account(row).expect("known tier");

        assert_eq!(account.user_id, UserId::from_uuid(user));
        assert_eq!(account.status_tier, StatusTier::Gold);
        assert_eq!(account.total_confirmed_visits, 11);
        assert_eq!(account.redeemable_points, 240);
        assert_eq!(account.revision, 7);
    }

    #[rstest]
    fn unknown_tier_is_a_query_error() {
        let err = row_to_account(account_row("Bronze")).expect_err("unknown tier");
        assert!(err.to_string().contains("Bronze"));
    }

    #[rstest]
    fn transaction_rows_borrow_domain_values() {
        let transaction = LoyaltyTransaction {
            id: Uuid::new_v4(),
            user_id: UserId::random(),
            transaction_type: TransactionType::Redeemed,
            points_delta: -30,
            description: "Free hot towel".to_owned(),
            booking_ref: Some("BK-77".to_owned()),
            created_at: Utc::now(),
        };

        let row = transaction_row(&transaction);

        assert_eq!(row.transaction_type, "REDEEMED");
        assert_eq!(row.points_delta, -30);
        assert_eq!(row.booking_ref, Some("BK-77"));
    }
}
