//! PostgreSQL-backed `LoyaltySettingsRepository` over the `default` settings row.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::LoyaltySettings;
use crate::domain::ports::{LoyaltySettingsRepository, LoyaltySettingsRepositoryError};

use super::diesel_basic_error_mapping::{
    counter_from_db, counter_to_db, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{LoyaltySettingsUpsert, LoyaltySettingsRow};
use super::pool::{DbPool, PoolError};
use super::schema::loyalty_settings;

/// Key of the settings singleton.
const SETTINGS_KEY: &str = "default";

/// Diesel-backed implementation of the `LoyaltySettingsRepository` port.
#[derive(Clone)]
pub struct DieselLoyaltySettingsRepository {
    pool: DbPool,
}

impl DieselLoyaltySettingsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LoyaltySettingsRepositoryError {
    map_basic_pool_error(error, LoyaltySettingsRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LoyaltySettingsRepositoryError {
    map_basic_diesel_error(
        error,
        LoyaltySettingsRepositoryError::query,
        LoyaltySettingsRepositoryError::connection,
    )
}

fn row_to_settings(row: LoyaltySettingsRow) -> LoyaltySettings {
    LoyaltySettings {
        service_rate_silver: row.service_rate_silver,
        service_rate_gold: row.service_rate_gold,
        service_rate_platinum: row.service_rate_platinum,
        silver_threshold: counter_from_db(row.silver_threshold),
        gold_threshold: counter_from_db(row.gold_threshold),
        platinum_threshold: counter_from_db(row.platinum_threshold),
        late_cancellation_penalty: counter_from_db(row.late_cancellation_penalty),
        no_show_penalty: counter_from_db(row.no_show_penalty),
    }
}

fn settings_upsert(
    settings: &LoyaltySettings,
) -> Result<LoyaltySettingsUpsert<'static>, LoyaltySettingsRepositoryError> {
    let column = |value: u32| counter_to_db(value, LoyaltySettingsRepositoryError::query);
    Ok(LoyaltySettingsUpsert {
        id: SETTINGS_KEY,
        service_rate_silver: settings.service_rate_silver,
        service_rate_gold: settings.service_rate_gold,
        service_rate_platinum: settings.service_rate_platinum,
        silver_threshold: column(settings.silver_threshold)?,
        gold_threshold: column(settings.gold_threshold)?,
        platinum_threshold: column(settings.platinum_threshold)?,
        late_cancellation_penalty: column(settings.late_cancellation_penalty)?,
        no_show_penalty: column(settings.no_show_penalty)?,
        updated_at: Utc::now(),
    })
}

#[async_trait]
impl LoyaltySettingsRepository for DieselLoyaltySettingsRepository {
    async fn load(&self) -> Result<Option<LoyaltySettings>, LoyaltySettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<LoyaltySettingsRow> = loyalty_settings::table
            .filter(loyalty_settings::id.eq(SETTINGS_KEY))
            .select(LoyaltySettingsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_settings))
    }

    async fn save(&self, settings: &LoyaltySettings) -> Result<(), LoyaltySettingsRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let upsert = settings_upsert(settings)?;

        diesel::insert_into(loyalty_settings::table)
            .values(&upsert)
            .on_conflict(loyalty_settings::id)
            .do_update()
            .set((
                loyalty_settings::service_rate_silver
                    .eq(excluded(loyalty_settings::service_rate_silver)),
                loyalty_settings::service_rate_gold.eq(excluded(loyalty_settings::service_rate_gold)),
                loyalty_settings::service_rate_platinum
                    .eq(excluded(loyalty_settings::service_rate_platinum)),
                loyalty_settings::silver_threshold.eq(excluded(loyalty_settings::silver_threshold)),
                loyalty_settings::gold_threshold.eq(excluded(loyalty_settings::gold_threshold)),
                loyalty_settings::platinum_threshold
                    .eq(excluded(loyalty_settings::platinum_threshold)),
                loyalty_settings::late_cancellation_penalty
                    .eq(excluded(loyalty_settings::late_cancellation_penalty)),
                loyalty_settings::no_show_penalty.eq(excluded(loyalty_settings::no_show_penalty)),
                loyalty_settings::updated_at.eq(excluded(loyalty_settings::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
