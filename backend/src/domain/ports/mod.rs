//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports ([`CallerAuthenticator`], [`LoyaltyCommand`],
//! [`LoyaltyQuery`], [`LoyaltySettingsAdmin`]) are called by inbound adapters.
//! Driven ports ([`IdentityProvider`], [`LoyaltyRepository`],
//! [`LoyaltySettingsRepository`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod caller_authenticator;
mod identity_provider;
mod loyalty_command;
mod loyalty_query;
mod loyalty_repository;
mod loyalty_settings_admin;
mod loyalty_settings_repository;

pub use caller_authenticator::CallerAuthenticator;
#[cfg(test)]
pub use caller_authenticator::MockCallerAuthenticator;
#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{
    FIXTURE_ADMIN_ID, FIXTURE_ADMIN_TOKEN, FIXTURE_BARBER_ID, FIXTURE_BARBER_TOKEN,
    FIXTURE_CUSTOMER_ID, FIXTURE_CUSTOMER_TOKEN, FixtureIdentityProvider, IdentityClaims,
    IdentityProvider, IdentityProviderError,
};
#[cfg(test)]
pub use loyalty_command::MockLoyaltyCommand;
pub use loyalty_command::{
    ApplyPenaltyRequest, LoyaltyCommand, PenaltyOutcome, RecordTransactionRequest,
    RecordVisitRequest, RedeemPointsRequest, RedemptionOutcome, TierCheckOutcome, VisitOutcome,
};
pub use loyalty_query::LoyaltyQuery;
#[cfg(test)]
pub use loyalty_query::MockLoyaltyQuery;
#[cfg(test)]
pub use loyalty_repository::MockLoyaltyRepository;
pub use loyalty_repository::{
    DEFAULT_HISTORY_LIMIT, HistoryPage, InMemoryLoyaltyRepository, LedgerCommit,
    LoyaltyRepository, LoyaltyRepositoryError, MAX_HISTORY_LIMIT,
};
pub use loyalty_settings_admin::LoyaltySettingsAdmin;
#[cfg(test)]
pub use loyalty_settings_admin::MockLoyaltySettingsAdmin;
#[cfg(test)]
pub use loyalty_settings_repository::MockLoyaltySettingsRepository;
pub use loyalty_settings_repository::{
    InMemoryLoyaltySettingsRepository, LoyaltySettingsRepository, LoyaltySettingsRepositoryError,
};
