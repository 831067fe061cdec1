//! Loyalty ledger domain service.
//!
//! Implements the loyalty driving ports over the ledger and settings
//! repositories. Mutations follow a read, plan, commit cycle: the current
//! account and settings are loaded, a pure planning step decides the new
//! account state and transactions, and the result is committed atomically
//! against the revision that was read. A concurrent writer causes the cycle
//! to repeat, up to [`MAX_COMMIT_ATTEMPTS`] times.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{
    ApplyPenaltyRequest, HistoryPage, LedgerCommit, LoyaltyCommand, LoyaltyQuery,
    LoyaltyRepository, LoyaltyRepositoryError, LoyaltySettingsAdmin, LoyaltySettingsRepository,
    LoyaltySettingsRepositoryError, PenaltyOutcome, RecordTransactionRequest, RecordVisitRequest,
    RedeemPointsRequest, RedemptionOutcome, TierCheckOutcome, VisitOutcome,
};
use crate::domain::{
    Error, LoyaltyAccount, LoyaltySettings, LoyaltySettingsUpdate, LoyaltyStats,
    LoyaltyTransaction, MAX_LEDGER_COUNTER, TierDistribution, TransactionType, UserId,
    assess_penalty, penalty_description, points_for_visit, progress_to_next_tier,
    tier_after_visits, upgrade_message,
};

/// Commit attempts before a concurrent modification is reported.
pub const MAX_COMMIT_ATTEMPTS: u32 = 3;

const DEFAULT_REDEMPTION_DESCRIPTION: &str = "Points redeemed";

/// Add `delta` to a stored counter, refusing results above [`MAX_LEDGER_COUNTER`].
fn bounded_add(current: u32, delta: u32) -> Option<u32> {
    current
        .checked_add(delta)
        .filter(|total| *total <= MAX_LEDGER_COUNTER)
}

/// Outcome of planning a mutation against the current account.
enum LedgerPlan<T> {
    /// Nothing to write.
    Unchanged(T),
    /// Write the account and transactions, then return `outcome`.
    Write {
        account: LoyaltyAccount,
        transactions: Vec<LoyaltyTransaction>,
        outcome: T,
    },
}

/// Inputs handed to a planning step.
struct PlanContext<'a> {
    user_id: UserId,
    current: Option<LoyaltyAccount>,
    settings: &'a LoyaltySettings,
    now: DateTime<Utc>,
}

impl PlanContext<'_> {
    fn account_or_opened(&self) -> LoyaltyAccount {
        self.current
            .clone()
            .unwrap_or_else(|| LoyaltyAccount::opened(self.user_id, self.now))
    }

    fn existing_account(&self) -> Result<LoyaltyAccount, Error> {
        self.current.clone().ok_or_else(|| {
            Error::not_found("Loyalty account not found")
                .with_details(json!({ "userId": self.user_id.to_string() }))
        })
    }

    fn transaction(
        &self,
        transaction_type: TransactionType,
        points_delta: i64,
        description: String,
        booking_ref: Option<String>,
    ) -> LoyaltyTransaction {
        LoyaltyTransaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            transaction_type,
            points_delta,
            description,
            booking_ref,
            created_at: self.now,
        }
    }

    /// Append the zero-point upgrade notice when `account` qualifies.
    fn apply_upgrade(
        &self,
        account: &mut LoyaltyAccount,
        transactions: &mut Vec<LoyaltyTransaction>,
    ) -> bool {
        let Some(tier) =
            tier_after_visits(account.status_tier, account.total_confirmed_visits, self.settings)
        else {
            return false;
        };
        account.status_tier = tier;
        transactions.push(self.transaction(
            TransactionType::Earned,
            0,
            upgrade_message(tier, account.total_confirmed_visits),
            None,
        ));
        true
    }
}

/// Loyalty ledger service implementing the command, query and settings ports.
#[derive(Clone)]
pub struct LoyaltyLedgerService<R, S> {
    ledger: Arc<R>,
    settings: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<R, S> LoyaltyLedgerService<R, S> {
    /// Create a service over the given repositories.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use barbershop_backend::domain::LoyaltyLedgerService;
    /// # use barbershop_backend::domain::ports::{
    /// #     InMemoryLoyaltyRepository, InMemoryLoyaltySettingsRepository,
    /// # };
    /// # use mockable::DefaultClock;
    /// let service = LoyaltyLedgerService::new(
    ///     Arc::new(InMemoryLoyaltyRepository::new()),
    ///     Arc::new(InMemoryLoyaltySettingsRepository::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(ledger: Arc<R>, settings: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            settings,
            clock,
        }
    }
}

impl<R, S> LoyaltyLedgerService<R, S>
where
    R: LoyaltyRepository,
    S: LoyaltySettingsRepository,
{
    fn map_ledger_error(error: LoyaltyRepositoryError) -> Error {
        match error {
            LoyaltyRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("loyalty ledger unavailable: {message}"))
            }
            LoyaltyRepositoryError::Query { message } => {
                Error::internal(format!("loyalty ledger error: {message}"))
            }
            LoyaltyRepositoryError::RevisionMismatch { expected, actual } => {
                Self::concurrent_modification(expected, actual)
            }
        }
    }

    fn map_settings_error(error: LoyaltySettingsRepositoryError) -> Error {
        match error {
            LoyaltySettingsRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("loyalty settings unavailable: {message}"))
            }
            LoyaltySettingsRepositoryError::Query { message } => {
                Error::internal(format!("loyalty settings error: {message}"))
            }
        }
    }

    fn concurrent_modification(expected: u32, actual: u32) -> Error {
        Error::conflict("loyalty account was modified concurrently; retry the request")
            .with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            }))
    }

    async fn load_settings(&self) -> Result<LoyaltySettings, Error> {
        let stored = self
            .settings
            .load()
            .await
            .map_err(Self::map_settings_error)?;
        Ok(stored.unwrap_or_default())
    }

    async fn load_account(&self, user_id: &UserId) -> Result<Option<LoyaltyAccount>, Error> {
        self.ledger
            .find_account(user_id)
            .await
            .map_err(Self::map_ledger_error)
    }

    /// Run the read, plan, commit cycle for `user_id`.
    async fn mutate<T, F>(&self, user_id: UserId, plan: F) -> Result<T, Error>
    where
        F: Fn(&PlanContext<'_>) -> Result<LedgerPlan<T>, Error> + Send + Sync,
        T: Send,
    {
        let settings = self.load_settings().await?;
        let mut last_conflict = (0, 0);

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let current = self.load_account(&user_id).await?;
            let expected_revision = current.as_ref().map(|account| account.revision);
            let context = PlanContext {
                user_id,
                current,
                settings: &settings,
                now: self.clock.utc(),
            };

            let (mut account, transactions, outcome) = match plan(&context)? {
                LedgerPlan::Unchanged(outcome) => return Ok(outcome),
                LedgerPlan::Write {
                    account,
                    transactions,
                    outcome,
                } => (account, transactions, outcome),
            };
            account.revision = expected_revision.map_or(1, |revision| revision + 1);
            account.updated_at = context.now;

            let commit = LedgerCommit {
                account,
                expected_revision,
                transactions,
            };
            match self.ledger.commit(&commit).await {
                Ok(()) => return Ok(outcome),
                Err(LoyaltyRepositoryError::RevisionMismatch { expected, actual }) => {
                    debug!(%user_id, attempt, expected, actual, "ledger commit lost a race; retrying");
                    last_conflict = (expected, actual);
                }
                Err(other) => return Err(Self::map_ledger_error(other)),
            }
        }

        let (expected, actual) = last_conflict;
        Err(Self::concurrent_modification(expected, actual))
    }
}

#[async_trait]
impl<R, S> LoyaltyCommand for LoyaltyLedgerService<R, S>
where
    R: LoyaltyRepository,
    S: LoyaltySettingsRepository,
{
    async fn apply_penalty(&self, request: ApplyPenaltyRequest) -> Result<PenaltyOutcome, Error> {
        let ApplyPenaltyRequest {
            user_id,
            penalty_type,
            booking_ref,
            reason,
        } = request;
        let description = penalty_description(penalty_type, reason.as_deref());

        let outcome = self
            .mutate(user_id, |context| {
                let mut account = context.existing_account()?;
                let assessment =
                    assess_penalty(account.redeemable_points, penalty_type, context.settings);
                account.redeemable_points = assessment.new_balance;
                let transaction = context.transaction(
                    TransactionType::Penalty,
                    -i64::from(assessment.deducted),
                    description.clone(),
                    booking_ref.clone(),
                );
                Ok(LedgerPlan::Write {
                    account,
                    transactions: vec![transaction],
                    outcome: PenaltyOutcome {
                        penalty_applied: assessment.configured,
                        points_deducted: assessment.deducted,
                        new_point_balance: assessment.new_balance,
                        penalty_type,
                    },
                })
            })
            .await?;

        info!(
            %user_id,
            penalty_type = %penalty_type,
            deducted = outcome.points_deducted,
            new_balance = outcome.new_point_balance,
            "loyalty penalty applied"
        );
        Ok(outcome)
    }

    async fn check_and_upgrade_tier(&self, user_id: &UserId) -> Result<TierCheckOutcome, Error> {
        let outcome = self
            .mutate(*user_id, |context| {
                let mut account = context.account_or_opened();
                let mut transactions = Vec::new();
                let upgraded = context.apply_upgrade(&mut account, &mut transactions);
                let outcome = TierCheckOutcome {
                    current_tier: account.status_tier,
                    tier_upgraded: upgraded,
                    visit_count: account.total_confirmed_visits,
                };
                if upgraded {
                    Ok(LedgerPlan::Write {
                        account,
                        transactions,
                        outcome,
                    })
                } else {
                    Ok(LedgerPlan::Unchanged(outcome))
                }
            })
            .await?;

        if outcome.tier_upgraded {
            info!(%user_id, tier = %outcome.current_tier, visits = outcome.visit_count, "loyalty tier upgraded");
        }
        Ok(outcome)
    }

    async fn record_confirmed_visit(
        &self,
        request: RecordVisitRequest,
    ) -> Result<VisitOutcome, Error> {
        let RecordVisitRequest {
            user_id,
            booking_ref,
            amount_paid_minor,
        } = request;

        let outcome = self
            .mutate(user_id, |context| {
                let mut account = context.account_or_opened();
                let points =
                    points_for_visit(amount_paid_minor, account.status_tier, context.settings);
                let balance = account.redeemable_points;
                account.redeemable_points = bounded_add(balance, points).ok_or_else(|| {
                    Error::invalid_request("visit would push the point balance out of range")
                        .with_details(json!({
                            "field": "amountPaidMinor",
                            "code": "points_out_of_range",
                            "pointsEarned": points,
                            "currentBalance": balance,
                            "maximum": MAX_LEDGER_COUNTER,
                        }))
                })?;
                account.total_confirmed_visits = bounded_add(account.total_confirmed_visits, 1)
                    .ok_or_else(|| {
                        Error::invalid_request("visit count is out of range").with_details(json!({
                            "code": "visits_out_of_range",
                            "maximum": MAX_LEDGER_COUNTER,
                        }))
                    })?;

                let mut transactions = vec![context.transaction(
                    TransactionType::Earned,
                    i64::from(points),
                    format!("Earned {points} points for a confirmed visit"),
                    booking_ref.clone(),
                )];
                let upgraded = context.apply_upgrade(&mut account, &mut transactions);

                Ok(LedgerPlan::Write {
                    outcome: VisitOutcome {
                        points_earned: points,
                        total_confirmed_visits: account.total_confirmed_visits,
                        new_point_balance: account.redeemable_points,
                        current_tier: account.status_tier,
                        tier_upgraded: upgraded,
                    },
                    account,
                    transactions,
                })
            })
            .await?;

        info!(
            %user_id,
            points = outcome.points_earned,
            visits = outcome.total_confirmed_visits,
            upgraded = outcome.tier_upgraded,
            "confirmed visit recorded"
        );
        Ok(outcome)
    }

    async fn redeem_points(
        &self,
        request: RedeemPointsRequest,
    ) -> Result<RedemptionOutcome, Error> {
        let RedeemPointsRequest {
            user_id,
            points,
            description,
        } = request;
        if points == 0 {
            return Err(Error::invalid_request("points must be greater than zero")
                .with_details(json!({ "field": "points", "code": "not_positive" })));
        }
        let description = description
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_REDEMPTION_DESCRIPTION.to_owned());

        self.mutate(user_id, |context| {
            let mut account = context.existing_account()?;
            if points > account.redeemable_points {
                return Err(Error::invalid_request("insufficient points").with_details(json!({
                    "code": "insufficient_points",
                    "requested": points,
                    "available": account.redeemable_points,
                })));
            }
            account.redeemable_points -= points;
            let transaction = context.transaction(
                TransactionType::Redeemed,
                -i64::from(points),
                description.clone(),
                None,
            );
            Ok(LedgerPlan::Write {
                outcome: RedemptionOutcome {
                    points_redeemed: points,
                    new_point_balance: account.redeemable_points,
                },
                account,
                transactions: vec![transaction],
            })
        })
        .await
    }

    async fn record_transaction(
        &self,
        request: RecordTransactionRequest,
    ) -> Result<LoyaltyTransaction, Error> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(Error::invalid_request("description must not be empty")
                .with_details(json!({ "field": "description", "code": "missing_field" })));
        }

        let transaction = LoyaltyTransaction {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            transaction_type: request.transaction_type,
            points_delta: request.points_delta,
            description: description.to_owned(),
            booking_ref: request.booking_ref,
            created_at: self.clock.utc(),
        };
        self.ledger
            .append_transaction(&transaction)
            .await
            .map_err(Self::map_ledger_error)?;
        Ok(transaction)
    }
}

#[async_trait]
impl<R, S> LoyaltyQuery for LoyaltyLedgerService<R, S>
where
    R: LoyaltyRepository,
    S: LoyaltySettingsRepository,
{
    async fn stats(&self, user_id: &UserId) -> Result<LoyaltyStats, Error> {
        let settings = self.load_settings().await?;
        let account = self
            .load_account(user_id)
            .await?
            .unwrap_or_else(|| LoyaltyAccount::opened(*user_id, self.clock.utc()));
        let progress =
            progress_to_next_tier(account.status_tier, account.total_confirmed_visits, &settings);
        Ok(LoyaltyStats {
            total_confirmed_visits: account.total_confirmed_visits,
            redeemable_points: account.redeemable_points,
            status_tier: account.status_tier,
            progress_to_next_tier: progress.percent,
            next_tier: progress.next_tier,
        })
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: HistoryPage,
    ) -> Result<Vec<LoyaltyTransaction>, Error> {
        self.ledger
            .list_transactions(user_id, page)
            .await
            .map_err(Self::map_ledger_error)
    }

    async fn tier_distribution(&self) -> Result<TierDistribution, Error> {
        self.ledger
            .tier_distribution()
            .await
            .map_err(Self::map_ledger_error)
    }
}

#[async_trait]
impl<R, S> LoyaltySettingsAdmin for LoyaltyLedgerService<R, S>
where
    R: LoyaltyRepository,
    S: LoyaltySettingsRepository,
{
    async fn settings(&self) -> Result<LoyaltySettings, Error> {
        self.load_settings().await
    }

    async fn update_settings(
        &self,
        update: LoyaltySettingsUpdate,
    ) -> Result<LoyaltySettings, Error> {
        let current = self.load_settings().await?;
        if update.is_empty() {
            return Ok(current);
        }
        let merged = update.apply_to(&current);
        merged.validate().map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "code": "invalid_settings" }))
        })?;
        self.settings
            .save(&merged)
            .await
            .map_err(Self::map_settings_error)?;
        info!(?update, "loyalty settings updated");
        Ok(merged)
    }
}

#[cfg(test)]
#[path = "loyalty_service_tests.rs"]
mod tests;
