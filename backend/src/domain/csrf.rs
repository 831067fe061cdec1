//! CSRF token issuance and validation.
//!
//! Tokens are random UUIDs handed to the browser twice: in the response body
//! and in the `csrf-token` cookie. Nothing is stored server-side. Validation
//! is governed by a [`CsrfPolicy`]:
//!
//! - [`CsrfPolicy::HeaderOnly`] accepts any `X-CSRF-Token` header of at least
//!   [`CSRF_TOKEN_MIN_LENGTH`] characters. This is the deployed behaviour and
//!   the default.
//! - [`CsrfPolicy::DoubleSubmit`] additionally requires the cookie and a
//!   constant-time match between header and cookie.

use std::fmt;
use std::str::FromStr;

use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Request header carrying the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRF-Token";
/// Cookie carrying the CSRF token.
pub const CSRF_COOKIE: &str = "csrf-token";
/// Minimum accepted token length in characters.
pub const CSRF_TOKEN_MIN_LENGTH: usize = 30;
/// Cookie lifetime in seconds (24 hours).
pub const CSRF_COOKIE_MAX_AGE_SECS: i64 = 86_400;

/// How strictly CSRF tokens are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsrfPolicy {
    /// Header present and long enough.
    #[default]
    HeaderOnly,
    /// Header and cookie present and equal.
    DoubleSubmit,
}

/// Error raised when a CSRF policy name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown CSRF policy `{0}`; expected `header-only` or `double-submit`")]
pub struct UnknownCsrfPolicy(pub String);

impl FromStr for CsrfPolicy {
    type Err = UnknownCsrfPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header-only" | "header_only" => Ok(Self::HeaderOnly),
            "double-submit" | "double_submit" => Ok(Self::DoubleSubmit),
            other => Err(UnknownCsrfPolicy(other.to_owned())),
        }
    }
}

impl fmt::Display for CsrfPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderOnly => f.write_str("header-only"),
            Self::DoubleSubmit => f.write_str("double-submit"),
        }
    }
}

/// Reasons a request fails CSRF validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrfValidationError {
    /// No `X-CSRF-Token` header.
    #[error("CSRF token missing")]
    MissingHeader,
    /// Header shorter than [`CSRF_TOKEN_MIN_LENGTH`].
    #[error("CSRF token too short")]
    TooShort,
    /// Double-submit policy without a `csrf-token` cookie.
    #[error("CSRF cookie missing")]
    MissingCookie,
    /// Header and cookie differ.
    #[error("CSRF token mismatch")]
    Mismatch,
}

/// Check a request's CSRF material against `policy`.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::{CsrfPolicy, validate_csrf};
///
/// let token = "0b9c6b1e-52d5-4c0c-a1de-7d6f8a39e1f2";
/// assert!(validate_csrf(CsrfPolicy::HeaderOnly, Some(token), None).is_ok());
/// assert!(validate_csrf(CsrfPolicy::DoubleSubmit, Some(token), None).is_err());
/// ```
pub fn validate_csrf(
    policy: CsrfPolicy,
    header: Option<&str>,
    cookie: Option<&str>,
) -> Result<(), CsrfValidationError> {
    let header = header.ok_or(CsrfValidationError::MissingHeader)?;
    if header.chars().count() < CSRF_TOKEN_MIN_LENGTH {
        return Err(CsrfValidationError::TooShort);
    }

    match policy {
        CsrfPolicy::HeaderOnly => Ok(()),
        CsrfPolicy::DoubleSubmit => {
            let cookie = cookie.ok_or(CsrfValidationError::MissingCookie)?;
            if bool::from(header.as_bytes().ct_eq(cookie.as_bytes())) {
                Ok(())
            } else {
                Err(CsrfValidationError::Mismatch)
            }
        }
    }
}

/// Freshly issued CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Issue a new random token.
    pub fn issue() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
