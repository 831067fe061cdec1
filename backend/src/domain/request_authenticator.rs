//! Request authentication: bearer identity plus CSRF validation.
//!
//! Checks run in a fixed order so the cheapest rejection wins:
//!
//! 1. `Authorization` header present.
//! 2. CSRF token valid under the configured [`CsrfPolicy`].
//! 3. Header uses the `Bearer` scheme.
//! 4. Identity provider accepts the token.
//! 5. Role claim is known and, when required, matches exactly.
//!
//! Every failure message is prefixed with `Authentication failed: `.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{
    CallerAuthenticator, IdentityClaims, IdentityProvider, IdentityProviderError,
};
use crate::domain::{
    AuthRequest, AuthenticatedCaller, BearerToken, CsrfPolicy, CsrfValidationError, Error, Role,
    UNKNOWN_USER_NAME, UserId, validate_csrf,
};

const FAILURE_PREFIX: &str = "Authentication failed";

fn failure(detail: impl std::fmt::Display) -> String {
    format!("{FAILURE_PREFIX}: {detail}")
}

/// Authenticator backed by an [`IdentityProvider`].
#[derive(Clone)]
pub struct RequestAuthenticator<P> {
    provider: Arc<P>,
    csrf_policy: CsrfPolicy,
}

impl<P> RequestAuthenticator<P> {
    /// Create an authenticator using `provider` and `csrf_policy`.
    pub fn new(provider: Arc<P>, csrf_policy: CsrfPolicy) -> Self {
        Self {
            provider,
            csrf_policy,
        }
    }

    /// Policy applied to CSRF tokens.
    pub fn csrf_policy(&self) -> CsrfPolicy {
        self.csrf_policy
    }
}

impl<P> RequestAuthenticator<P>
where
    P: IdentityProvider,
{
    fn map_csrf_error(error: &CsrfValidationError) -> Error {
        let reason = match error {
            CsrfValidationError::MissingHeader => "missing_header",
            CsrfValidationError::TooShort => "too_short",
            CsrfValidationError::MissingCookie => "missing_cookie",
            CsrfValidationError::Mismatch => "mismatch",
        };
        Error::forbidden(failure("CSRF token validation failed"))
            .with_details(json!({ "code": "csrf_invalid", "reason": reason }))
    }

    fn map_provider_error(error: IdentityProviderError) -> Error {
        match error {
            IdentityProviderError::Rejected { message } => {
                debug!(%message, "identity provider rejected token");
                Error::unauthorized(failure("Invalid token"))
            }
            IdentityProviderError::Connection { message } => {
                Error::service_unavailable(failure(format!("identity provider unavailable: {message}")))
            }
            IdentityProviderError::Upstream { status, message } => Error::service_unavailable(
                failure(format!("identity provider returned status {status}: {message}")),
            ),
            IdentityProviderError::Decode { message } => {
                Error::internal(failure(format!("identity provider response invalid: {message}")))
            }
        }
    }

    fn caller_from_claims(claims: IdentityClaims) -> Result<AuthenticatedCaller, Error> {
        let id = UserId::new(&claims.user_id).map_err(|err| {
            Error::internal(failure(format!("identity provider returned {err}")))
        })?;
        let role = Role::from_claim(claims.role.as_deref()).map_err(|err| {
            warn!(user_id = %id, error = %err, "identity token carries unknown role");
            Error::unauthorized(failure("Unrecognised role"))
        })?;
        let name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_owned());
        Ok(AuthenticatedCaller {
            id,
            email: claims.email.unwrap_or_default(),
            role,
            name,
        })
    }
}

#[async_trait]
impl<P> CallerAuthenticator for RequestAuthenticator<P>
where
    P: IdentityProvider,
{
    async fn authenticate(
        &self,
        request: &AuthRequest,
        required_role: Option<Role>,
    ) -> Result<AuthenticatedCaller, Error> {
        let authorization = request
            .authorization
            .as_deref()
            .ok_or_else(|| Error::unauthorized(failure("No authorization header")))?;

        if let Err(err) = validate_csrf(
            self.csrf_policy,
            request.csrf_header.as_deref(),
            request.csrf_cookie.as_deref(),
        ) {
            warn!(policy = %self.csrf_policy, reason = %err, "CSRF validation failed");
            return Err(Self::map_csrf_error(&err));
        }

        let token = BearerToken::parse(authorization)
            .map_err(|err| Error::unauthorized(failure(err)))?;
        let claims = self
            .provider
            .resolve(&token)
            .await
            .map_err(Self::map_provider_error)?;
        let caller = Self::caller_from_claims(claims)?;

        if let Some(required) = required_role
            && !caller.has_role(required)
        {
            debug!(user_id = %caller.id, role = %caller.role, required = %required, "role mismatch");
            return Err(Error::forbidden(failure(format!(
                "Unauthorized: {required} role required"
            ))));
        }

        Ok(caller)
    }
}

#[cfg(test)]
#[path = "request_authenticator_tests.rs"]
mod tests;
