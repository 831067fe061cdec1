//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use barbershop_backend::domain::CsrfPolicy;
use barbershop_backend::inbound::http::state::CsrfCookieConfig;
use barbershop_backend::outbound::persistence::DbPool;
use barbershop_backend::settings::IdentitySettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) identity: IdentitySettings,
    pub(crate) csrf_policy: CsrfPolicy,
    pub(crate) csrf_cookie: CsrfCookieConfig,
    pub(crate) cors_origin: Option<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration with header-only CSRF, a `Secure`
    /// CSRF cookie, any CORS origin, and in-memory stores.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, identity: IdentitySettings) -> Self {
        Self {
            bind_addr,
            identity,
            csrf_policy: CsrfPolicy::default(),
            csrf_cookie: CsrfCookieConfig::default(),
            cors_origin: None,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the ledger and settings stores.
    ///
    /// Without a pool the server keeps ledger state in memory, which is only
    /// suitable for development.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Select the CSRF policy and cookie attributes.
    #[must_use]
    pub fn with_csrf(mut self, policy: CsrfPolicy, cookie: CsrfCookieConfig) -> Self {
        self.csrf_policy = policy;
        self.csrf_cookie = cookie;
        self
    }

    /// Restrict CORS to a single origin.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }

    /// Whether the ledger is backed by PostgreSQL.
    #[must_use]
    pub fn has_database(&self) -> bool {
        self.db_pool.is_some()
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
