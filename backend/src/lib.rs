//! Barbershop loyalty backend library.
//!
//! Layout follows ports and adapters:
//!
//! - [`domain`]: ledger rules, request authentication and the ports they
//!   drive or depend on.
//! - [`inbound`]: Actix handlers translating HTTP into domain calls.
//! - [`outbound`]: PostgreSQL and identity service adapters.
//! - [`middleware`]: request tracing and CORS.
//! - [`settings`]: `BARBERSHOP_*` configuration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::{Cors, Trace};
