//! Identity provider outbound adapters.
//!
//! Provides a reqwest implementation of the `IdentityProvider` port that asks
//! the hosted auth service who a bearer token belongs to.

mod dto;
mod http_identity_provider;

pub use http_identity_provider::{HttpIdentityProvider, HttpIdentityProviderBuildError};
