//! bb8 pool of `diesel-async` PostgreSQL connections shared by the loyalty
//! repositories.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_MIN_IDLE: u32 = 1;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Pool failures, carrying the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available before the checkout timeout.
    #[error("database connection unavailable: {0}")]
    Checkout(String),
    /// The pool could not be created, typically a bad URL.
    #[error("database pool could not be built: {0}")]
    Build(String),
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout(message.into())
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Driver message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Checkout(message) | Self::Build(message) => message,
        }
    }
}

/// Sizing and timeouts for [`DbPool`].
///
/// ```
/// use std::time::Duration;
/// use barbershop_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://barber@localhost/loyalty")
///     .with_max_size(16)
///     .with_checkout_timeout(Duration::from_secs(2));
/// assert_eq!(config.max_size(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: u32,
    checkout_timeout: Duration,
    idle_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: DEFAULT_MIN_IDLE,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Upper bound on open connections; zero is raised to one.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self.min_idle = self.min_idle.min(self.max_size);
        self
    }

    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Cloneable handle to the shared connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Connect using `config`.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when bb8 rejects the configuration or the first
    /// connections cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_size,
            min_idle,
            checkout_timeout,
            idle_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        Pool::builder()
            .max_size(max_size)
            .min_idle(Some(min_idle))
            .connection_timeout(checkout_timeout)
            .idle_timeout(Some(idle_timeout))
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::build(err.to_string()))
    }

    /// Borrow a connection for one repository operation.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when the checkout timeout elapses.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Open and idle connection counts, for startup logging.
    pub fn connections(&self) -> (u32, u32) {
        let state = self.inner.state();
        (state.connections, state.idle_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_suit_a_single_shop() {
        let config = PoolConfig::new("postgres://localhost/loyalty");

        assert_eq!(config.max_size(), DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, DEFAULT_MIN_IDLE);
        assert_eq!(config.checkout_timeout, DEFAULT_CHECKOUT_TIMEOUT);
    }

    #[rstest]
    #[case(0, 1, 1)]
    #[case(4, 4, 1)]
    fn max_size_is_at_least_one_and_bounds_idle(
        #[case] requested: u32,
        #[case] max_size: u32,
        #[case] min_idle: u32,
    ) {
        let config = PoolConfig::new("postgres://localhost/loyalty").with_max_size(requested);

        assert_eq!(config.max_size(), max_size);
        assert_eq!(config.min_idle, min_idle);
    }

    #[rstest]
    fn errors_expose_the_driver_message() {
        let err = PoolError::checkout("timed out");
        assert_eq!(err.message(), "timed out");
        assert_eq!(err.to_string(), "database connection unavailable: timed out");
    }
}
