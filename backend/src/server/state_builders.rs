//! Builders for HTTP state ports.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::warn;

use barbershop_backend::domain::ports::{
    CallerAuthenticator, FixtureIdentityProvider, IdentityProvider, InMemoryLoyaltyRepository,
    InMemoryLoyaltySettingsRepository, LoyaltyCommand, LoyaltyQuery, LoyaltyRepository,
    LoyaltySettingsAdmin, LoyaltySettingsRepository,
};
use barbershop_backend::domain::{CsrfPolicy, LoyaltyLedgerService, RequestAuthenticator};
use barbershop_backend::inbound::http::state::{HttpState, HttpStatePorts};
use barbershop_backend::outbound::identity::{
    HttpIdentityProvider, HttpIdentityProviderBuildError,
};
use barbershop_backend::outbound::persistence::{
    DbPool, DieselLoyaltyRepository, DieselLoyaltySettingsRepository,
};
use barbershop_backend::settings::IdentitySettings;

use super::ServerConfig;

/// Driving ports served by one ledger service instance.
struct LedgerPorts {
    loyalty: Arc<dyn LoyaltyCommand>,
    loyalty_query: Arc<dyn LoyaltyQuery>,
    settings: Arc<dyn LoyaltySettingsAdmin>,
}

fn ledger_ports<R, S>(ledger: Arc<R>, settings: Arc<S>) -> LedgerPorts
where
    R: LoyaltyRepository + 'static,
    S: LoyaltySettingsRepository + 'static,
{
    let service = Arc::new(LoyaltyLedgerService::new(
        ledger,
        settings,
        Arc::new(DefaultClock),
    ));
    LedgerPorts {
        loyalty: service.clone(),
        loyalty_query: service.clone(),
        settings: service,
    }
}

/// Use Diesel repositories when a pool is configured, otherwise in-memory
/// stores.
fn build_ledger_ports(pool: Option<&DbPool>) -> LedgerPorts {
    match pool {
        Some(pool) => ledger_ports(
            Arc::new(DieselLoyaltyRepository::new(pool.clone())),
            Arc::new(DieselLoyaltySettingsRepository::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; loyalty ledger state is held in memory");
            ledger_ports(
                Arc::new(InMemoryLoyaltyRepository::new()),
                Arc::new(InMemoryLoyaltySettingsRepository::default()),
            )
        }
    }
}

fn authenticator<P>(provider: P, policy: CsrfPolicy) -> Arc<dyn CallerAuthenticator>
where
    P: IdentityProvider + 'static,
{
    Arc::new(RequestAuthenticator::new(Arc::new(provider), policy))
}

fn build_authenticator(
    identity: &IdentitySettings,
    policy: CsrfPolicy,
) -> Result<Arc<dyn CallerAuthenticator>, HttpIdentityProviderBuildError> {
    match identity {
        IdentitySettings::Http {
            base_url,
            api_key,
            timeout,
        } => {
            let provider = HttpIdentityProvider::new(base_url.clone(), api_key.as_str(), *timeout)?;
            Ok(authenticator(provider, policy))
        }
        IdentitySettings::Fixture => {
            warn!("fixture identity provider enabled; fixture bearer tokens are accepted");
            Ok(authenticator(FixtureIdentityProvider, policy))
        }
    }
}

/// Assemble handler state from configuration.
///
/// # Errors
///
/// Returns an error when the identity provider client cannot be built.
pub(super) fn build_http_state(
    config: &ServerConfig,
) -> Result<web::Data<HttpState>, HttpIdentityProviderBuildError> {
    let auth = build_authenticator(&config.identity, config.csrf_policy)?;
    let LedgerPorts {
        loyalty,
        loyalty_query,
        settings,
    } = build_ledger_ports(config.db_pool.as_ref());

    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            auth,
            loyalty,
            loyalty_query,
            settings,
        },
        config.csrf_cookie,
    )))
}
