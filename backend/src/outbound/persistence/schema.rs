//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Cached per-user loyalty state.
    ///
    /// One row per user. `revision` is bumped on every committed change and
    /// guards concurrent writers.
    loyalty_accounts (user_id) {
        /// Primary key: owning user.
        user_id -> Uuid,
        /// Confirmed visits so far; never decreases.
        total_confirmed_visits -> Int4,
        /// Spendable balance; never negative.
        redeemable_points -> Int4,
        /// `Silver`, `Gold` or `Platinum`.
        status_tier -> Varchar,
        /// Optimistic concurrency revision.
        revision -> Int4,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only loyalty ledger.
    loyalty_transactions (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// `EARNED`, `PENALTY` or `REDEEMED`.
        transaction_type -> Varchar,
        points_delta -> Int8,
        description -> Text,
        booking_ref -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Programme settings. A single row keyed `default`.
    loyalty_settings (id) {
        id -> Varchar,
        service_rate_silver -> Float8,
        service_rate_gold -> Float8,
        service_rate_platinum -> Float8,
        silver_threshold -> Int4,
        gold_threshold -> Int4,
        platinum_threshold -> Int4,
        late_cancellation_penalty -> Int4,
        no_show_penalty -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(loyalty_accounts, loyalty_transactions);
