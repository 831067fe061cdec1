//! Tests for the loyalty ledger service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    InMemoryLoyaltyRepository, InMemoryLoyaltySettingsRepository, MockLoyaltyRepository,
    MockLoyaltySettingsRepository,
};
use crate::domain::{ErrorCode, PenaltyType, StatusTier};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

type MemoryService = LoyaltyLedgerService<InMemoryLoyaltyRepository, InMemoryLoyaltySettingsRepository>;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

struct Harness {
    ledger: Arc<InMemoryLoyaltyRepository>,
    service: MemoryService,
    user: UserId,
}

impl Harness {
    async fn seed(&self, visits: u32, points: u32, tier: StatusTier) {
        let account = LoyaltyAccount {
            total_confirmed_visits: visits,
            redeemable_points: points,
            status_tier: tier,
            revision: 1,
            ..LoyaltyAccount::opened(self.user, fixed_now())
        };
        self.ledger
            .commit(&LedgerCommit {
                account,
                expected_revision: None,
                transactions: Vec::new(),
            })
            .await
            .expect("seed account");
    }

    async fn account(&self) -> LoyaltyAccount {
        self.ledger
            .find_account(&self.user)
            .await
            .expect("lookup succeeds")
            .expect("account exists")
    }

    async fn transactions(&self) -> Vec<LoyaltyTransaction> {
        self.ledger
            .list_transactions(&self.user, HistoryPage::default())
            .await
            .expect("history loads")
    }
}

#[fixture]
fn harness() -> Harness {
    let ledger = Arc::new(InMemoryLoyaltyRepository::new());
    let service = LoyaltyLedgerService::new(
        Arc::clone(&ledger),
        Arc::new(InMemoryLoyaltySettingsRepository::default()),
        Arc::new(FixedClock(fixed_now())),
    );
    Harness {
        ledger,
        service,
        user: UserId::random(),
    }
}

fn penalty(user: UserId, penalty_type: PenaltyType) -> ApplyPenaltyRequest {
    ApplyPenaltyRequest {
        user_id: user,
        penalty_type,
        booking_ref: Some("BK-1001".to_owned()),
        reason: None,
    }
}

#[rstest]
#[case::partial_balance(40, PenaltyType::NoShow, 50, 40, 0)]
#[case::full_deduction(100, PenaltyType::LateCancellation, 25, 25, 75)]
#[case::empty_balance(0, PenaltyType::NoShow, 50, 0, 0)]
#[tokio::test]
async fn apply_penalty_clamps_at_zero(
    harness: Harness,
    #[case] balance: u32,
    #[case] penalty_type: PenaltyType,
    #[case] applied: u32,
    #[case] deducted: u32,
    #[case] remaining: u32,
) {
    harness.seed(3, balance, StatusTier::Silver).await;

    let outcome = harness
        .service
        .apply_penalty(penalty(harness.user, penalty_type))
        .await
        .expect("penalty applied");

    assert_eq!(outcome.penalty_applied, applied);
    assert_eq!(outcome.points_deducted, deducted);
    assert_eq!(outcome.new_point_balance, remaining);
    assert_eq!(outcome.penalty_type, penalty_type);

    let account = harness.account().await;
    assert_eq!(account.redeemable_points, remaining);
    assert_eq!(account.revision, 2);

    let history = harness.transactions().await;
    assert_eq!(history.len(), 1);
    let entry = history.first().expect("penalty entry");
    assert_eq!(entry.transaction_type, TransactionType::Penalty);
    assert_eq!(entry.points_delta, -i64::from(deducted));
    assert_eq!(entry.booking_ref.as_deref(), Some("BK-1001"));
    assert_eq!(entry.created_at, fixed_now());
}

#[rstest]
#[tokio::test]
async fn apply_penalty_uses_reason_in_description(harness: Harness) {
    harness.seed(1, 60, StatusTier::Silver).await;
    let request = ApplyPenaltyRequest {
        reason: Some("Cancelled 10 minutes before".to_owned()),
        ..penalty(harness.user, PenaltyType::LateCancellation)
    };

    harness
        .service
        .apply_penalty(request)
        .await
        .expect("penalty applied");

    let history = harness.transactions().await;
    assert_eq!(
        history.first().map(|entry| entry.description.as_str()),
        Some("late cancellation penalty (Cancelled 10 minutes before)")
    );
}

#[rstest]
#[tokio::test]
async fn apply_penalty_without_account_is_not_found(harness: Harness) {
    let err = harness
        .service
        .apply_penalty(penalty(harness.user, PenaltyType::NoShow))
        .await
        .expect_err("no account");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(harness.transactions().await.is_empty());
}

#[rstest]
#[case::silver_to_gold(10, StatusTier::Silver, StatusTier::Gold, true)]
#[case::gold_to_platinum(20, StatusTier::Gold, StatusTier::Platinum, true)]
#[case::silver_below_gold(9, StatusTier::Silver, StatusTier::Silver, false)]
#[case::platinum_stays(40, StatusTier::Platinum, StatusTier::Platinum, false)]
#[case::one_step_only(25, StatusTier::Silver, StatusTier::Gold, true)]
#[tokio::test]
async fn check_and_upgrade_tier_moves_one_step(
    harness: Harness,
    #[case] visits: u32,
    #[case] start: StatusTier,
    #[case] expected: StatusTier,
    #[case] upgraded: bool,
) {
    harness.seed(visits, 0, start).await;

    let outcome = harness
        .service
        .check_and_upgrade_tier(&harness.user)
        .await
        .expect("tier check succeeds");

    assert_eq!(outcome.current_tier, expected);
    assert_eq!(outcome.tier_upgraded, upgraded);
    assert_eq!(outcome.visit_count, visits);
    assert_eq!(harness.account().await.status_tier, expected);

    let history = harness.transactions().await;
    if upgraded {
        let entry = history.first().expect("upgrade notice");
        assert_eq!(entry.transaction_type, TransactionType::Earned);
        assert_eq!(entry.points_delta, 0);
        assert_eq!(
            entry.description,
            format!("Congratulations! You've been upgraded to {expected} status after {visits} visits.")
        );
    } else {
        assert!(history.is_empty());
    }
}

#[rstest]
#[tokio::test]
async fn check_and_upgrade_tier_without_account_reports_silver(harness: Harness) {
    let outcome = harness
        .service
        .check_and_upgrade_tier(&harness.user)
        .await
        .expect("tier check succeeds");

    assert_eq!(outcome.current_tier, StatusTier::Silver);
    assert!(!outcome.tier_upgraded);
    assert_eq!(outcome.visit_count, 0);
    assert!(
        harness
            .ledger
            .find_account(&harness.user)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn first_visit_opens_account_and_earns_points(harness: Harness) {
    let outcome = harness
        .service
        .record_confirmed_visit(RecordVisitRequest {
            user_id: harness.user,
            booking_ref: Some("BK-1".to_owned()),
            amount_paid_minor: 2_500,
        })
        .await
        .expect("visit recorded");

    assert_eq!(outcome.points_earned, 125);
    assert_eq!(outcome.total_confirmed_visits, 1);
    assert_eq!(outcome.new_point_balance, 125);
    assert_eq!(outcome.current_tier, StatusTier::Silver);
    assert!(!outcome.tier_upgraded);

    let account = harness.account().await;
    assert_eq!(account.revision, 1);
    assert_eq!(account.updated_at, fixed_now());
}

#[rstest]
#[tokio::test]
async fn tenth_visit_earns_at_silver_rate_then_upgrades(harness: Harness) {
    harness.seed(9, 10, StatusTier::Silver).await;

    let outcome = harness
        .service
        .record_confirmed_visit(RecordVisitRequest {
            user_id: harness.user,
            booking_ref: None,
            amount_paid_minor: 1_000,
        })
        .await
        .expect("visit recorded");

    assert_eq!(outcome.points_earned, 50);
    assert_eq!(outcome.new_point_balance, 60);
    assert_eq!(outcome.total_confirmed_visits, 10);
    assert_eq!(outcome.current_tier, StatusTier::Gold);
    assert!(outcome.tier_upgraded);
    assert_eq!(harness.transactions().await.len(), 2);
}

#[rstest]
#[case::huge_amount(0, u64::MAX)]
#[case::balance_at_limit(MAX_LEDGER_COUNTER, 100)]
#[case::balance_near_limit(MAX_LEDGER_COUNTER - 10, 1_000)]
#[tokio::test]
async fn visit_points_beyond_the_ledger_range_are_rejected(
    harness: Harness,
    #[case] balance: u32,
    #[case] amount_paid_minor: u64,
) {
    harness.seed(3, balance, StatusTier::Silver).await;

    let err = harness
        .service
        .record_confirmed_visit(RecordVisitRequest {
            user_id: harness.user,
            booking_ref: None,
            amount_paid_minor,
        })
        .await
        .expect_err("balance would overflow");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|details| details.get("code")),
        Some(&serde_json::json!("points_out_of_range"))
    );
    let account = harness.account().await;
    assert_eq!(account.redeemable_points, balance);
    assert_eq!(account.total_confirmed_visits, 3);
    assert!(harness.transactions().await.is_empty());
}

#[rstest]
#[tokio::test]
async fn visit_may_fill_the_balance_exactly_to_the_limit(harness: Harness) {
    harness.seed(3, MAX_LEDGER_COUNTER - 50, StatusTier::Silver).await;

    let outcome = harness
        .service
        .record_confirmed_visit(RecordVisitRequest {
            user_id: harness.user,
            booking_ref: None,
            amount_paid_minor: 1_000,
        })
        .await
        .expect("visit recorded");

    assert_eq!(outcome.points_earned, 50);
    assert_eq!(outcome.new_point_balance, MAX_LEDGER_COUNTER);
}

#[rstest]
#[tokio::test]
async fn update_settings_rejects_counters_beyond_the_ledger_range(harness: Harness) {
    let err = harness
        .service
        .update_settings(LoyaltySettingsUpdate {
            no_show_penalty: Some(MAX_LEDGER_COUNTER + 1),
            ..Default::default()
        })
        .await
        .expect_err("penalty out of range");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        harness.service.settings().await.expect("reload"),
        LoyaltySettings::default()
    );
}

#[rstest]
#[case::partial(100, 40, 60)]
#[case::everything(100, 100, 0)]
#[tokio::test]
async fn redeem_points_reduces_balance(
    harness: Harness,
    #[case] balance: u32,
    #[case] points: u32,
    #[case] remaining: u32,
) {
    harness.seed(2, balance, StatusTier::Silver).await;

    let outcome = harness
        .service
        .redeem_points(RedeemPointsRequest {
            user_id: harness.user,
            points,
            description: Some("  Free beard trim ".to_owned()),
        })
        .await
        .expect("redemption succeeds");

    assert_eq!(outcome.points_redeemed, points);
    assert_eq!(outcome.new_point_balance, remaining);
    let history = harness.transactions().await;
    let entry = history.first().expect("redemption entry");
    assert_eq!(entry.transaction_type, TransactionType::Redeemed);
    assert_eq!(entry.points_delta, -i64::from(points));
    assert_eq!(entry.description, "Free beard trim");
}

#[rstest]
#[case::zero_points(50, 0)]
#[case::insufficient(50, 51)]
#[tokio::test]
async fn redeem_points_rejects_invalid_amounts(
    harness: Harness,
    #[case] balance: u32,
    #[case] points: u32,
) {
    harness.seed(2, balance, StatusTier::Silver).await;

    let err = harness
        .service
        .redeem_points(RedeemPointsRequest {
            user_id: harness.user,
            points,
            description: None,
        })
        .await
        .expect_err("redemption rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(harness.account().await.redeemable_points, balance);
}

#[rstest]
#[tokio::test]
async fn record_transaction_appends_without_touching_balance(harness: Harness) {
    harness.seed(2, 30, StatusTier::Silver).await;

    let transaction = harness
        .service
        .record_transaction(RecordTransactionRequest {
            user_id: harness.user,
            transaction_type: TransactionType::Earned,
            points_delta: 15,
            description: "Referral bonus".to_owned(),
            booking_ref: None,
        })
        .await
        .expect("transaction recorded");

    assert_eq!(transaction.created_at, fixed_now());
    assert_eq!(harness.transactions().await, vec![transaction]);
    assert_eq!(harness.account().await.redeemable_points, 30);
}

#[rstest]
#[tokio::test]
async fn record_transaction_requires_description(harness: Harness) {
    let err = harness
        .service
        .record_transaction(RecordTransactionRequest {
            user_id: harness.user,
            transaction_type: TransactionType::Earned,
            points_delta: 5,
            description: "   ".to_owned(),
            booking_ref: None,
        })
        .await
        .expect_err("blank description");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case::fresh(None, 0, StatusTier::Silver, 0, Some(StatusTier::Gold))]
#[case::silver_partial(Some((3, StatusTier::Silver)), 3, StatusTier::Silver, 60, Some(StatusTier::Gold))]
#[case::silver_capped(Some((8, StatusTier::Silver)), 8, StatusTier::Silver, 100, Some(StatusTier::Gold))]
#[case::gold_midway(Some((7, StatusTier::Gold)), 7, StatusTier::Gold, 40, Some(StatusTier::Platinum))]
#[case::platinum(Some((30, StatusTier::Platinum)), 30, StatusTier::Platinum, 100, None)]
#[tokio::test]
async fn stats_report_progress(
    harness: Harness,
    #[case] seeded: Option<(u32, StatusTier)>,
    #[case] visits: u32,
    #[case] tier: StatusTier,
    #[case] progress: u8,
    #[case] next: Option<StatusTier>,
) {
    if let Some((seed_visits, seed_tier)) = seeded {
        harness.seed(seed_visits, 70, seed_tier).await;
    }

    let stats = harness
        .service
        .stats(&harness.user)
        .await
        .expect("stats load");

    assert_eq!(stats.total_confirmed_visits, visits);
    assert_eq!(stats.status_tier, tier);
    assert_eq!(stats.progress_to_next_tier, progress);
    assert_eq!(stats.next_tier, next);
}

#[rstest]
#[tokio::test]
async fn settings_fall_back_to_defaults_when_missing() {
    let mut store = MockLoyaltySettingsRepository::new();
    store.expect_load().times(1).return_once(|| Ok(None));
    let service = LoyaltyLedgerService::new(
        Arc::new(InMemoryLoyaltyRepository::new()),
        Arc::new(store),
        Arc::new(FixedClock(fixed_now())),
    );

    let settings = service.settings().await.expect("settings load");
    assert_eq!(settings, LoyaltySettings::default());
}

#[rstest]
#[tokio::test]
async fn update_settings_merges_and_persists(harness: Harness) {
    let updated = harness
        .service
        .update_settings(LoyaltySettingsUpdate {
            no_show_penalty: Some(80),
            ..Default::default()
        })
        .await
        .expect("update accepted");

    assert_eq!(updated.no_show_penalty, 80);
    assert_eq!(updated.late_cancellation_penalty, 25);
    assert_eq!(harness.service.settings().await.expect("reload"), updated);
}

#[rstest]
#[tokio::test]
async fn update_settings_rejects_unordered_thresholds(harness: Harness) {
    let err = harness
        .service
        .update_settings(LoyaltySettingsUpdate {
            gold_threshold: Some(30),
            ..Default::default()
        })
        .await
        .expect_err("invalid thresholds");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        harness.service.settings().await.expect("reload"),
        LoyaltySettings::default()
    );
}

#[rstest]
#[tokio::test]
async fn empty_settings_update_skips_save() {
    let mut store = MockLoyaltySettingsRepository::new();
    store
        .expect_load()
        .times(1)
        .return_once(|| Ok(Some(LoyaltySettings::default())));
    store.expect_save().never();
    let service = LoyaltyLedgerService::new(
        Arc::new(InMemoryLoyaltyRepository::new()),
        Arc::new(store),
        Arc::new(FixedClock(fixed_now())),
    );

    let settings = service
        .update_settings(LoyaltySettingsUpdate::default())
        .await
        .expect("no-op update");
    assert_eq!(settings, LoyaltySettings::default());
}

fn seeded_account(user: UserId) -> LoyaltyAccount {
    LoyaltyAccount {
        redeemable_points: 100,
        revision: 4,
        ..LoyaltyAccount::opened(user, fixed_now())
    }
}

fn service_over(ledger: MockLoyaltyRepository) -> LoyaltyLedgerService<MockLoyaltyRepository, InMemoryLoyaltySettingsRepository> {
    LoyaltyLedgerService::new(
        Arc::new(ledger),
        Arc::new(InMemoryLoyaltySettingsRepository::default()),
        Arc::new(FixedClock(fixed_now())),
    )
}

#[rstest]
#[tokio::test]
async fn commit_retries_after_revision_mismatch() {
    let user = UserId::random();
    let mut ledger = MockLoyaltyRepository::new();
    ledger
        .expect_find_account()
        .times(2)
        .returning(move |_| Ok(Some(seeded_account(user))));
    let mut attempts = 0;
    ledger.expect_commit().times(2).returning(move |commit| {
        attempts += 1;
        assert_eq!(commit.expected_revision, Some(4));
        assert_eq!(commit.account.revision, 5);
        if attempts == 1 {
            Err(LoyaltyRepositoryError::revision_mismatch(4_u32, 5_u32))
        } else {
            Ok(())
        }
    });

    let outcome = service_over(ledger)
        .apply_penalty(penalty(user, PenaltyType::LateCancellation))
        .await
        .expect("second attempt commits");
    assert_eq!(outcome.new_point_balance, 75);
}

#[rstest]
#[tokio::test]
async fn persistent_conflict_surfaces_as_conflict() {
    let user = UserId::random();
    let mut ledger = MockLoyaltyRepository::new();
    ledger
        .expect_find_account()
        .times(3)
        .returning(move |_| Ok(Some(seeded_account(user))));
    ledger
        .expect_commit()
        .times(3)
        .returning(|_| Err(LoyaltyRepositoryError::revision_mismatch(4_u32, 6_u32)));

    let err = service_over(ledger)
        .apply_penalty(penalty(user, PenaltyType::NoShow))
        .await
        .expect_err("conflict reported");

    assert_eq!(err.code(), ErrorCode::Conflict);
    let details = err.details().expect("conflict details");
    assert_eq!(details["code"], "revision_mismatch");
    assert_eq!(details["actualRevision"], 6);
}

#[rstest]
#[case::connection(LoyaltyRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(LoyaltyRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn ledger_errors_map_to_domain_codes(
    #[case] error: LoyaltyRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut ledger = MockLoyaltyRepository::new();
    ledger
        .expect_tier_distribution()
        .times(1)
        .return_once(move || Err(error));

    let err = service_over(ledger)
        .tier_distribution()
        .await
        .expect_err("repository failure");
    assert_eq!(err.code(), expected);
}
