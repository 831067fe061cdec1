//! Authentication primitives: bearer credentials and the transport-neutral
//! view of an incoming request consumed by the request authenticator.
//!
//! Inbound adapters copy the relevant headers into [`AuthRequest`] so the
//! domain never depends on a web framework's request type.

use std::fmt;

use zeroize::Zeroizing;

/// Authorization scheme accepted by [`BearerToken::parse`].
pub const BEARER_SCHEME: &str = "Bearer";

/// Errors raised while parsing an `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerTokenError {
    /// The header did not use the `Bearer` scheme.
    #[error("authorization header must use the Bearer scheme")]
    UnsupportedScheme,
    /// The scheme was present but no token followed it.
    #[error("bearer token must not be empty")]
    EmptyToken,
}

/// Opaque identity credential presented by the caller.
///
/// The token is held in zeroizing storage and never printed by `Debug`.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::BearerToken;
///
/// let token = BearerToken::parse("Bearer abc.def").unwrap();
/// assert_eq!(token.expose(), "abc.def");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Parse an `Authorization` header value.
    ///
    /// The scheme name is matched case-insensitively as HTTP requires.
    pub fn parse(header: &str) -> Result<Self, BearerTokenError> {
        let trimmed = header.trim();
        let (scheme, rest) = match trimmed.split_once(' ') {
            Some((scheme, rest)) => (scheme, rest),
            None => (trimmed, ""),
        };
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
            return Err(BearerTokenError::UnsupportedScheme);
        }
        let token = rest.trim();
        if token.is_empty() {
            return Err(BearerTokenError::EmptyToken);
        }
        Ok(Self(Zeroizing::new(token.to_owned())))
    }

    /// Raw token text for forwarding to the identity provider.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Request attributes consulted during authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    /// Raw `Authorization` header.
    pub authorization: Option<String>,
    /// Raw `X-CSRF-Token` header.
    pub csrf_header: Option<String>,
    /// Value of the `csrf-token` cookie.
    pub csrf_cookie: Option<String>,
}

impl AuthRequest {
    /// Request carrying only an `Authorization` header.
    pub fn with_authorization(value: impl Into<String>) -> Self {
        Self {
            authorization: Some(value.into()),
            ..Self::default()
        }
    }

    /// Attach an `X-CSRF-Token` header value.
    #[must_use]
    pub fn csrf_header(mut self, value: impl Into<String>) -> Self {
        self.csrf_header = Some(value.into());
        self
    }

    /// Attach a `csrf-token` cookie value.
    #[must_use]
    pub fn csrf_cookie(mut self, value: impl Into<String>) -> Self {
        self.csrf_cookie = Some(value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc", "abc")]
    #[case("bearer abc", "abc")]
    #[case("  BEARER   abc  ", "abc")]
    fn parse_accepts_bearer_scheme(#[case] header: &str, #[case] expected: &str) {
        let token = BearerToken::parse(header).expect("valid bearer header");
        assert_eq!(token.expose(), expected);
    }

    #[rstest]
    #[case("Basic dXNlcjpwYXNz", BearerTokenError::UnsupportedScheme)]
    #[case("abc", BearerTokenError::UnsupportedScheme)]
    #[case("", BearerTokenError::UnsupportedScheme)]
    #[case("Bearer", BearerTokenError::EmptyToken)]
    #[case("Bearer    ", BearerTokenError::EmptyToken)]
    fn parse_rejects_malformed_headers(#[case] header: &str, #[case] expected: BearerTokenError) {
        assert_eq!(BearerToken::parse(header), Err(expected));
    }

    #[rstest]
    fn debug_redacts_token() {
        let token = BearerToken::parse("Bearer secret-value").expect("valid header");
        assert!(!format!("{token:?}").contains("secret-value"));
    }

    #[rstest]
    fn builder_sets_fields() {
        let request = AuthRequest::with_authorization("Bearer a")
            .csrf_header("h")
            .csrf_cookie("c");
        assert_eq!(request.authorization.as_deref(), Some("Bearer a"));
        assert_eq!(request.csrf_header.as_deref(), Some("h"));
        assert_eq!(request.csrf_cookie.as_deref(), Some("c"));
    }
}
