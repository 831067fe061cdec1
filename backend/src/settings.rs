//! Service configuration loaded via OrthoConfig.
//!
//! Every value can be supplied as a `BARBERSHOP_*` environment variable or the
//! matching command-line flag. Raw values stay strings here; the accessors
//! parse them into typed settings so a bad value names the offending key.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{CsrfPolicy, UnknownCsrfPolicy};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Raised when a configured value cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        /// Value as configured.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// `csrf_policy` names no known policy.
    #[error(transparent)]
    CsrfPolicy(#[from] UnknownCsrfPolicy),
    /// `identity_url` is not an absolute URL.
    #[error("invalid identity provider URL `{value}`: {source}")]
    IdentityUrl {
        /// Value as configured.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// An identity URL was given without an API key.
    #[error("identity_api_key is required when identity_url is set")]
    MissingIdentityApiKey,
    /// Neither the hosted identity provider nor the fixture provider is enabled.
    #[error("no identity provider configured; set identity_url or enable fixture_identity")]
    NoIdentityProvider,
}

/// Configuration values for the loyalty backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BARBERSHOP")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. In-memory stores are used when unset.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply pending migrations before serving. On when unset.
    pub run_migrations: Option<bool>,
    /// Base URL of the hosted identity service.
    pub identity_url: Option<String>,
    /// Project API key sent alongside bearer tokens.
    pub identity_api_key: Option<String>,
    /// Identity lookup timeout in seconds.
    pub identity_timeout_secs: Option<u64>,
    /// Accept the built-in fixture tokens instead of a hosted identity service.
    pub fixture_identity: Option<bool>,
    /// `header-only` or `double-submit`.
    pub csrf_policy: Option<String>,
    /// Mark the CSRF cookie `Secure`. On when unset.
    pub csrf_cookie_secure: Option<bool>,
    /// Origin allowed by CORS. Any origin is allowed when unset.
    pub cors_origin: Option<String>,
}

/// Identity backend selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySettings {
    /// Resolve tokens against a hosted auth service.
    Http {
        /// Service base URL.
        base_url: Url,
        /// Project API key.
        api_key: String,
        /// Per-request timeout.
        timeout: Duration,
    },
    /// Accept the fixture tokens.
    Fixture,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Parsed CSRF policy, defaulting to header-only.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::CsrfPolicy`] for an unknown policy name.
    pub fn csrf_policy(&self) -> Result<CsrfPolicy, SettingsError> {
        self.csrf_policy
            .as_deref()
            .map_or(Ok(CsrfPolicy::default()), str::parse)
            .map_err(SettingsError::from)
    }

    /// Configured pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Whether pending migrations run at startup; defaults to `true`.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Whether the CSRF cookie carries `Secure`; defaults to `true`.
    pub fn csrf_cookie_secure(&self) -> bool {
        self.csrf_cookie_secure.unwrap_or(true)
    }

    /// Whether fixture tokens are accepted; defaults to `false`.
    pub fn fixture_identity(&self) -> bool {
        self.fixture_identity.unwrap_or(false)
    }

    /// Identity backend to use.
    ///
    /// A configured `identity_url` wins over `fixture_identity`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed, the API key is missing, or
    /// no backend is configured at all.
    pub fn identity(&self) -> Result<IdentitySettings, SettingsError> {
        let Some(raw_url) = self.identity_url.as_deref() else {
            return if self.fixture_identity() {
                Ok(IdentitySettings::Fixture)
            } else {
                Err(SettingsError::NoIdentityProvider)
            };
        };
        let base_url = Url::parse(raw_url).map_err(|source| SettingsError::IdentityUrl {
            value: raw_url.to_owned(),
            source,
        })?;
        let api_key = self
            .identity_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SettingsError::MissingIdentityApiKey)?;
        let timeout = Duration::from_secs(
            self.identity_timeout_secs
                .unwrap_or(DEFAULT_IDENTITY_TIMEOUT_SECS),
        );
        Ok(IdentitySettings::Http {
            base_url,
            api_key,
            timeout,
        })
    }
}
