//! Caller identity primitives: user identifiers, roles, and the resolved
//! caller returned by the request authenticator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised while parsing identity values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The role attribute named an unknown role.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Stable user identifier issued by the identity provider.
///
/// ## Invariants
/// - Always a valid UUID; the canonical hyphenated form is used on the wire.
///
/// # Examples
/// ```
/// use barbershop_backend::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from a string.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref().trim();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role attribute carried by the identity token.
///
/// Roles are compared for exact equality; there is no hierarchy, so an admin
/// does not implicitly satisfy a barber-only requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role for any authenticated account.
    #[default]
    Customer,
    /// Staff member who confirms visits.
    Barber,
    /// Administrator managing penalties and settings.
    Admin,
}

impl Role {
    /// Wire representation of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Barber => "barber",
            Self::Admin => "admin",
        }
    }

    /// Resolve an optional role claim, defaulting to [`Role::Customer`].
    pub fn from_claim(claim: Option<&str>) -> Result<Self, UserValidationError> {
        match claim.map(str::trim) {
            None | Some("") => Ok(Self::Customer),
            Some(value) => value.parse(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "barber" => Ok(Self::Barber),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Display name used when the identity provider has none on record.
pub const UNKNOWN_USER_NAME: &str = "Unknown User";

/// Caller resolved from a verified identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedCaller {
    /// Identity provider user id.
    pub id: UserId,
    /// Email on record, empty when the provider has none.
    pub email: String,
    /// Role attribute.
    pub role: Role,
    /// Display name, defaulting to [`UNKNOWN_USER_NAME`].
    pub name: String,
}

impl AuthenticatedCaller {
    /// Whether the caller holds exactly `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}
