//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed loyalty ledger and settings stores
//!   using Diesel ORM.
//! - **identity**: reqwest client resolving bearer tokens against the hosted
//!   auth service.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod identity;
pub mod persistence;
