//! Driven port for the singleton loyalty settings row.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::LoyaltySettings;

use super::define_port_error;

define_port_error! {
    /// Errors raised by loyalty settings adapters.
    pub enum LoyaltySettingsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "settings repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "settings repository query failed: {message}",
    }
}

/// Port for reading and replacing programme settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltySettingsRepository: Send + Sync {
    /// Load the stored settings, `None` when the row is absent.
    async fn load(&self) -> Result<Option<LoyaltySettings>, LoyaltySettingsRepositoryError>;

    /// Replace the stored settings.
    async fn save(&self, settings: &LoyaltySettings) -> Result<(), LoyaltySettingsRepositoryError>;
}

/// Process-local settings store used when no database is configured.
#[derive(Debug)]
pub struct InMemoryLoyaltySettingsRepository {
    settings: RwLock<LoyaltySettings>,
}

impl InMemoryLoyaltySettingsRepository {
    /// Store seeded with `settings`.
    pub fn new(settings: LoyaltySettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

impl Default for InMemoryLoyaltySettingsRepository {
    fn default() -> Self {
        Self::new(LoyaltySettings::default())
    }
}

#[async_trait]
impl LoyaltySettingsRepository for InMemoryLoyaltySettingsRepository {
    async fn load(&self) -> Result<Option<LoyaltySettings>, LoyaltySettingsRepositoryError> {
        Ok(Some(*self.settings.read().await))
    }

    async fn save(&self, settings: &LoyaltySettings) -> Result<(), LoyaltySettingsRepositoryError> {
        *self.settings.write().await = *settings;
        Ok(())
    }
}
