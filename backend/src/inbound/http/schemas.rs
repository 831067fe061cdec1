//! OpenAPI mirrors of the domain error types, which stay free of utoipa.

use utoipa::ToSchema;

/// Documented form of [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode, rename_all = "snake_case")]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Role mismatch or CSRF validation failure.
    Forbidden,
    /// The loyalty account does not exist.
    NotFound,
    /// The account changed concurrently; retry the request.
    Conflict,
    /// The ledger store or identity provider is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    InternalError,
}

/// Error envelope rendered for every failed request.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Always `false` for errors.
    #[schema(example = false)]
    success: bool,
    /// Human-readable message returned to clients.
    #[schema(example = "Authentication failed: No authorization header")]
    error: String,
    /// Stable machine-readable error code.
    #[schema(example = "unauthorized")]
    code: ErrorCodeSchema,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "6a1f1f0e-2b55-4c1f-9d0f-4f8c2f5f2e11")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}
