//! Loyalty and authentication domain.
//!
//! Nothing here depends on actix or Diesel. Adapters reach the services
//! through the traits in [`ports`]:
//!
//! - [`RequestAuthenticator`] validates bearer identity and CSRF material.
//! - [`LoyaltyLedgerService`] owns balances, tiers and the transaction log.
//! - [`Error`] and [`ErrorCode`] describe every failure either can return.

pub mod auth;
pub mod csrf;
pub mod error;
pub mod loyalty;
pub mod ports;
pub mod trace_id;
pub mod user;

mod loyalty_service;
mod request_authenticator;

pub use self::auth::{AuthRequest, BEARER_SCHEME, BearerToken, BearerTokenError};
pub use self::csrf::{
    CSRF_COOKIE, CSRF_COOKIE_MAX_AGE_SECS, CSRF_HEADER, CSRF_TOKEN_MIN_LENGTH, CsrfPolicy,
    CsrfToken, CsrfValidationError, UnknownCsrfPolicy, validate_csrf,
};
pub use self::error::{Error, ErrorCode};
pub use self::loyalty::{
    LoyaltyAccount, LoyaltySettings, LoyaltySettingsUpdate, LoyaltyStats, LoyaltyTransaction,
    MAX_LEDGER_COUNTER, PenaltyAssessment, PenaltyType, SettingsValidationError, StatusTier,
    TierDistribution, TierProgress, TransactionType, UnknownVariant, assess_penalty,
    penalty_description, points_for_visit, progress_to_next_tier, tier_after_visits, upgrade_message,
};
pub use self::loyalty_service::{LoyaltyLedgerService, MAX_COMMIT_ATTEMPTS};
pub use self::request_authenticator::RequestAuthenticator;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AuthenticatedCaller, Role, UNKNOWN_USER_NAME, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use barbershop_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
