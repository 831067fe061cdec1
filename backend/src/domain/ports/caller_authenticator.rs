//! Driving port used by inbound adapters to authenticate a request.

use async_trait::async_trait;

use crate::domain::{AuthRequest, AuthenticatedCaller, Error, Role};

/// Authenticate callers before any sensitive handler runs.
///
/// Implementations validate the bearer token and the CSRF token. When
/// `required_role` is given, the caller's role must match it exactly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallerAuthenticator: Send + Sync {
    /// Authenticate `request`, optionally requiring a role.
    ///
    /// # Errors
    ///
    /// - `unauthorized` when the token is missing or rejected.
    /// - `forbidden` on CSRF failure or role mismatch.
    /// - `service_unavailable` when the identity provider cannot be reached.
    async fn authenticate(
        &self,
        request: &AuthRequest,
        required_role: Option<Role>,
    ) -> Result<AuthenticatedCaller, Error>;

    /// Authenticate and require [`Role::Admin`].
    async fn authenticate_admin(&self, request: &AuthRequest) -> Result<AuthenticatedCaller, Error> {
        self.authenticate(request, Some(Role::Admin)).await
    }

    /// Authenticate and require [`Role::Barber`].
    async fn authenticate_barber(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthenticatedCaller, Error> {
        self.authenticate(request, Some(Role::Barber)).await
    }
}
