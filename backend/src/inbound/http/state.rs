//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CallerAuthenticator, LoyaltyCommand, LoyaltyQuery, LoyaltySettingsAdmin,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: Arc<dyn CallerAuthenticator>,
    pub loyalty: Arc<dyn LoyaltyCommand>,
    pub loyalty_query: Arc<dyn LoyaltyQuery>,
    pub settings: Arc<dyn LoyaltySettingsAdmin>,
}

/// Attributes of the `csrf-token` cookie issued by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrfCookieConfig {
    /// Whether the cookie carries the `Secure` attribute.
    pub secure: bool,
}

impl Default for CsrfCookieConfig {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn CallerAuthenticator>,
    pub loyalty: Arc<dyn LoyaltyCommand>,
    pub loyalty_query: Arc<dyn LoyaltyQuery>,
    pub settings: Arc<dyn LoyaltySettingsAdmin>,
    pub csrf_cookie: CsrfCookieConfig,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, CsrfCookieConfig::default())
    }
}

impl HttpState {
    /// Construct state from the ports bundle and cookie attributes.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use barbershop_backend::domain::ports::{
    ///     FixtureIdentityProvider, InMemoryLoyaltyRepository, InMemoryLoyaltySettingsRepository,
    /// };
    /// use barbershop_backend::domain::{CsrfPolicy, LoyaltyLedgerService, RequestAuthenticator};
    /// use barbershop_backend::inbound::http::state::{CsrfCookieConfig, HttpState, HttpStatePorts};
    /// use mockable::DefaultClock;
    ///
    /// let ledger = Arc::new(LoyaltyLedgerService::new(
    ///     Arc::new(InMemoryLoyaltyRepository::new()),
    ///     Arc::new(InMemoryLoyaltySettingsRepository::default()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let ports = HttpStatePorts {
    ///     auth: Arc::new(RequestAuthenticator::new(
    ///         Arc::new(FixtureIdentityProvider),
    ///         CsrfPolicy::HeaderOnly,
    ///     )),
    ///     loyalty: ledger.clone(),
    ///     loyalty_query: ledger.clone(),
    ///     settings: ledger,
    /// };
    /// let state = HttpState::new(ports, CsrfCookieConfig { secure: false });
    /// assert!(!state.csrf_cookie.secure);
    /// ```
    pub fn new(ports: HttpStatePorts, csrf_cookie: CsrfCookieConfig) -> Self {
        let HttpStatePorts {
            auth,
            loyalty,
            loyalty_query,
            settings,
        } = ports;
        Self {
            auth,
            loyalty,
            loyalty_query,
            settings,
            csrf_cookie,
        }
    }
}
