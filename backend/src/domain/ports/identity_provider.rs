//! Driven port resolving bearer tokens against the external identity provider.
//!
//! The provider is authoritative for who the caller is and which role they
//! hold. Adapters return raw claims; the request authenticator applies the
//! defaulting rules (customer role, "Unknown User" name).

use async_trait::async_trait;

use crate::domain::BearerToken;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The provider refused the token (expired, revoked, malformed).
        Rejected { message: String } => "identity token rejected: {message}",
        /// The provider could not be reached.
        Connection { message: String } => "identity provider unreachable: {message}",
        /// The provider answered with an unexpected status.
        Upstream { status: u16, message: String } =>
            "identity provider returned status {status}: {message}",
        /// The provider's response could not be decoded.
        Decode { message: String } => "identity provider response invalid: {message}",
    }
}

/// Claims attached to a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Provider user id as issued.
    pub user_id: String,
    /// Email on record.
    pub email: Option<String>,
    /// Role attribute from the provider's application metadata.
    pub role: Option<String>,
    /// Display name from the provider's user metadata.
    pub name: Option<String>,
}

/// Port for verifying bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve `token` to the claims of the user it was issued to.
    async fn resolve(&self, token: &BearerToken) -> Result<IdentityClaims, IdentityProviderError>;
}

/// Token accepted by [`FixtureIdentityProvider`] for an admin caller.
pub const FIXTURE_ADMIN_TOKEN: &str = "fixture-admin";
/// Token accepted by [`FixtureIdentityProvider`] for a barber caller.
pub const FIXTURE_BARBER_TOKEN: &str = "fixture-barber";
/// Token accepted by [`FixtureIdentityProvider`] for a customer caller.
pub const FIXTURE_CUSTOMER_TOKEN: &str = "fixture-customer";

/// Fixture user id for the admin token.
pub const FIXTURE_ADMIN_ID: &str = "00000000-0000-4000-8000-00000000000a";
/// Fixture user id for the barber token.
pub const FIXTURE_BARBER_ID: &str = "00000000-0000-4000-8000-00000000000b";
/// Fixture user id for the customer token.
pub const FIXTURE_CUSTOMER_ID: &str = "00000000-0000-4000-8000-00000000000c";

/// In-process provider recognising three fixed tokens.
///
/// Used for local development and tests; every other token is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn resolve(&self, token: &BearerToken) -> Result<IdentityClaims, IdentityProviderError> {
        let (user_id, email, role, name) = match token.expose() {
            FIXTURE_ADMIN_TOKEN => (FIXTURE_ADMIN_ID, "admin@barbershop.test", "admin", "Ada Admin"),
            FIXTURE_BARBER_TOKEN => (
                FIXTURE_BARBER_ID,
                "barber@barbershop.test",
                "barber",
                "Bo Barber",
            ),
            FIXTURE_CUSTOMER_TOKEN => {
                return Ok(IdentityClaims {
                    user_id: FIXTURE_CUSTOMER_ID.to_owned(),
                    email: Some("customer@barbershop.test".to_owned()),
                    role: None,
                    name: None,
                });
            }
            _ => return Err(IdentityProviderError::rejected("unknown fixture token")),
        };
        Ok(IdentityClaims {
            user_id: user_id.to_owned(),
            email: Some(email.to_owned()),
            role: Some(role.to_owned()),
            name: Some(name.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn token(raw: &str) -> BearerToken {
        BearerToken::parse(&format!("Bearer {raw}")).expect("valid bearer header")
    }

    #[rstest]
    #[case(FIXTURE_ADMIN_TOKEN, Some("admin"))]
    #[case(FIXTURE_BARBER_TOKEN, Some("barber"))]
    #[case(FIXTURE_CUSTOMER_TOKEN, None)]
    #[tokio::test]
    async fn fixture_resolves_known_tokens(#[case] raw: &str, #[case] role: Option<&str>) {
        let claims = FixtureIdentityProvider
            .resolve(&token(raw))
            .await
            .expect("fixture token resolves");
        assert_eq!(claims.role.as_deref(), role);
    }

    #[tokio::test]
    async fn fixture_rejects_unknown_tokens() {
        let err = FixtureIdentityProvider
            .resolve(&token("forged"))
            .await
            .expect_err("unknown token");
        assert!(matches!(err, IdentityProviderError::Rejected { .. }));
    }
}
