//! Administrator loyalty endpoints.
//!
//! ```text
//! POST  /api/v1/admin/loyalty/transactions
//! GET   /api/v1/admin/loyalty/settings
//! PATCH /api/v1/admin/loyalty/settings
//! GET   /api/v1/admin/loyalty/overview
//! ```

use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};

use crate::domain::ports::RecordTransactionRequest;
use crate::domain::{Error, LoyaltySettings, TransactionType};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::loyalty_dto::{
    OverviewResponse, SettingsPatchRequest, SettingsPayload, SettingsResponse,
    TransactionPayload, TransactionRequest, TransactionResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, non_blank, parse_choice, parse_user_id, require_text,
};

const TRANSACTION_TYPES: &str = "EARNED, PENALTY, REDEEMED";

fn parse_transaction_request(payload: TransactionRequest) -> Result<RecordTransactionRequest, Error> {
    let user_id = parse_user_id(payload.user_id, "userId")?;
    let transaction_type: TransactionType = parse_choice(
        payload.transaction_type,
        "transactionType",
        TRANSACTION_TYPES,
    )?;
    let points_delta = payload
        .points_delta
        .ok_or_else(|| missing_field_error("pointsDelta"))?;
    let description = require_text(payload.description, "description")?;
    Ok(RecordTransactionRequest {
        user_id,
        transaction_type,
        points_delta,
        description,
        booking_ref: non_blank(payload.booking_id),
    })
}

fn settings_response(settings: LoyaltySettings) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(SettingsResponse {
            success: true,
            settings: SettingsPayload::from(settings),
        })
}

/// Append a raw ledger entry without touching the cached balance.
#[utoipa::path(
    post,
    path = "/api/v1/admin/loyalty/transactions",
    request_body = TransactionRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role or CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "recordLoyaltyTransaction",
    security(("BearerAuth" = []))
)]
#[post("/admin/loyalty/transactions")]
pub async fn record_transaction(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<TransactionRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &request).await?;
    let command = parse_transaction_request(payload.into_inner())?;
    let transaction = state.loyalty.record_transaction(command).await?;
    Ok(HttpResponse::Ok().json(TransactionResponse {
        success: true,
        transaction: TransactionPayload::from(transaction),
    }))
}

/// Current programme settings.
#[utoipa::path(
    get,
    path = "/api/v1/admin/loyalty/settings",
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Loyalty settings", body = SettingsResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role or CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getLoyaltySettings",
    security(("BearerAuth" = []))
)]
#[get("/admin/loyalty/settings")]
pub async fn get_settings(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &request).await?;
    let settings = state.settings.settings().await?;
    Ok(settings_response(settings))
}

/// Partially update programme settings.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/loyalty/settings",
    request_body = SettingsPatchRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Updated settings", body = SettingsResponse),
        (status = 400, description = "Merged settings are invalid", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role or CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateLoyaltySettings",
    security(("BearerAuth" = []))
)]
#[patch("/admin/loyalty/settings")]
pub async fn update_settings(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<SettingsPatchRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &request).await?;
    let settings = state
        .settings
        .update_settings(payload.into_inner().into())
        .await?;
    Ok(settings_response(settings))
}

/// Membership totals per tier.
#[utoipa::path(
    get,
    path = "/api/v1/admin/loyalty/overview",
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Tier distribution", body = OverviewResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role or CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getLoyaltyOverview",
    security(("BearerAuth" = []))
)]
#[get("/admin/loyalty/overview")]
pub async fn get_overview(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &request).await?;
    let distribution = state.loyalty_query.tier_distribution().await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(OverviewResponse::from(distribution)))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
