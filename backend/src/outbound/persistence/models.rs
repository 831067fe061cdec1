//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to and from domain values live
//! in the repository modules.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{loyalty_accounts, loyalty_settings, loyalty_transactions};

/// Row struct for reading from the loyalty_accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loyalty_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoyaltyAccountRow {
    pub user_id: Uuid,
    pub total_confirmed_visits: i32,
    pub redeemable_points: i32,
    pub status_tier: String,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for opening an account.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loyalty_accounts)]
pub(crate) struct NewLoyaltyAccountRow {
    pub user_id: Uuid,
    pub total_confirmed_visits: i32,
    pub redeemable_points: i32,
    pub status_tier: &'static str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

/// Changeset applied by a revision-checked account update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = loyalty_accounts)]
pub(crate) struct LoyaltyAccountUpdate {
    pub total_confirmed_visits: i32,
    pub redeemable_points: i32,
    pub status_tier: &'static str,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger transactions
// ---------------------------------------------------------------------------

/// Row struct for reading from the loyalty_transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loyalty_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoyaltyTransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub points_delta: i64,
    pub description: String,
    pub booking_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loyalty_transactions)]
pub(crate) struct NewLoyaltyTransactionRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: &'static str,
    pub points_delta: i64,
    pub description: &'a str,
    pub booking_ref: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Row struct for the settings singleton.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loyalty_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoyaltySettingsRow {
    pub service_rate_silver: f64,
    pub service_rate_gold: f64,
    pub service_rate_platinum: f64,
    pub silver_threshold: i32,
    pub gold_threshold: i32,
    pub platinum_threshold: i32,
    pub late_cancellation_penalty: i32,
    pub no_show_penalty: i32,
}

/// Upsert payload for the settings singleton.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loyalty_settings)]
pub(crate) struct LoyaltySettingsUpsert<'a> {
    pub id: &'a str,
    pub service_rate_silver: f64,
    pub service_rate_gold: f64,
    pub service_rate_platinum: f64,
    pub silver_threshold: i32,
    pub gold_threshold: i32,
    pub platinum_threshold: i32,
    pub late_cancellation_penalty: i32,
    pub no_show_penalty: i32,
    pub updated_at: DateTime<Utc>,
}
