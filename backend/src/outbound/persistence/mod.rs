//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the loyalty ledger and settings ports on top of
//! `diesel-async` with `bb8` pooling. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) stay private to this module; every database error
//! is translated into the port's own error type.
//!
//! ```ignore
//! use barbershop_backend::outbound::persistence::{DbPool, DieselLoyaltyRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/loyalty")).await?;
//! let ledger = DieselLoyaltyRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_loyalty_repository;
mod diesel_loyalty_settings_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_loyalty_repository::DieselLoyaltyRepository;
pub use diesel_loyalty_settings_repository::DieselLoyaltySettingsRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
