//! Driving port for administering loyalty programme settings.

use async_trait::async_trait;

use crate::domain::{Error, LoyaltySettings, LoyaltySettingsUpdate};

/// Read and partially update the programme settings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoyaltySettingsAdmin: Send + Sync {
    /// Current settings, falling back to defaults when none are stored.
    async fn settings(&self) -> Result<LoyaltySettings, Error>;

    /// Overlay `update` on the current settings and store the result.
    ///
    /// # Errors
    /// `invalid_request` when the merged settings violate their invariants.
    async fn update_settings(&self, update: LoyaltySettingsUpdate)
    -> Result<LoyaltySettings, Error>;
}
