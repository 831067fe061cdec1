//! Loyalty ledger HTTP handlers.
//!
//! ```text
//! POST /api/v1/loyalty/penalties
//! POST /api/v1/loyalty/tier-check
//! GET  /api/v1/loyalty/stats
//! GET  /api/v1/loyalty/history
//! POST /api/v1/loyalty/redemptions
//! POST /api/v1/loyalty/visits
//! ```
//!
//! The JSON extractor rejects a malformed body with `invalid_request` before
//! the handler runs. Handlers then authenticate before checking individual
//! fields, so credential failures win over missing or invalid values.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;

use crate::domain::ports::{
    ApplyPenaltyRequest, HistoryPage, RecordVisitRequest, RedeemPointsRequest,
};
use crate::domain::{Error, PenaltyType, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_admin, require_caller, require_staff};
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::loyalty_dto::{
    HistoryQuery, HistoryResponse, PenaltyRequest, PenaltyResponse, RedemptionRequest,
    RedemptionResponse, StatsPayload, StatsResponse, TierCheckResponse, TransactionPayload,
    VisitRequest, VisitResponse,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, non_blank, parse_choice, parse_user_id,
};

const PENALTY_TYPES: &str = "late_cancellation, no_show";

fn parse_penalty_request(payload: PenaltyRequest) -> Result<ApplyPenaltyRequest, Error> {
    let user_id = parse_user_id(payload.user_id, "userId")?;
    let penalty_type: PenaltyType = parse_choice(
        payload.penalty_type,
        "penaltyType",
        PENALTY_TYPES,
    )?;
    Ok(ApplyPenaltyRequest {
        user_id,
        penalty_type,
        booking_ref: non_blank(payload.booking_id),
        reason: non_blank(payload.reason),
    })
}

fn points_not_positive_error(value: i64) -> Error {
    Error::invalid_request("points must be a positive whole number").with_details(json!({
        "field": "points",
        "value": value,
        "code": "not_positive",
    }))
}

fn parse_redemption_request(
    user_id: UserId,
    payload: RedemptionRequest,
) -> Result<RedeemPointsRequest, Error> {
    let raw = payload
        .points
        .ok_or_else(|| missing_field_error("points"))?;
    let points = u32::try_from(raw)
        .ok()
        .filter(|points| *points > 0)
        .ok_or_else(|| points_not_positive_error(raw))?;
    Ok(RedeemPointsRequest {
        user_id,
        points,
        description: non_blank(payload.description),
    })
}

fn parse_visit_request(payload: VisitRequest) -> Result<RecordVisitRequest, Error> {
    let user_id = parse_user_id(payload.user_id, "userId")?;
    let amount_paid_minor = payload
        .amount_paid_minor
        .ok_or_else(|| missing_field_error("amountPaidMinor"))?;
    Ok(RecordVisitRequest {
        user_id,
        booking_ref: non_blank(payload.booking_id),
        amount_paid_minor,
    })
}

/// Apply a late-cancellation or no-show penalty to a customer.
#[utoipa::path(
    post,
    path = "/api/v1/loyalty/penalties",
    request_body = PenaltyRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Penalty applied", body = PenaltyResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admin role or CSRF token required", body = ErrorSchema),
        (status = 404, description = "Customer has no loyalty account", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "applyLoyaltyPenalty",
    security(("BearerAuth" = []))
)]
#[post("/loyalty/penalties")]
pub async fn apply_penalty(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<PenaltyRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &request).await?;
    let command = parse_penalty_request(payload.into_inner())?;
    let outcome = state.loyalty.apply_penalty(command).await?;
    Ok(HttpResponse::Ok().json(PenaltyResponse::from(outcome)))
}

/// Evaluate one tier upgrade step for the signed-in caller.
#[utoipa::path(
    post,
    path = "/api/v1/loyalty/tier-check",
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Tier after evaluation", body = TierCheckResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "CSRF token required", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "checkLoyaltyTier",
    security(("BearerAuth" = []))
)]
#[post("/loyalty/tier-check")]
pub async fn check_tier(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let caller = require_caller(&state, &request).await?;
    let outcome = state.loyalty.check_and_upgrade_tier(&caller.id).await?;
    Ok(HttpResponse::Ok().json(TierCheckResponse::from(outcome)))
}

/// Loyalty snapshot for the signed-in caller.
#[utoipa::path(
    get,
    path = "/api/v1/loyalty/stats",
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (
            status = 200,
            description = "Loyalty stats",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = StatsResponse
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "getLoyaltyStats",
    security(("BearerAuth" = []))
)]
#[get("/loyalty/stats")]
pub async fn get_stats(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<HttpResponse> {
    let caller = require_caller(&state, &request).await?;
    let stats = state.loyalty_query.stats(&caller.id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(StatsResponse {
            success: true,
            stats: StatsPayload::from(stats),
        }))
}

/// Ledger entries for the signed-in caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/loyalty/history",
    params(
        ("limit" = Option<u32>, Query, description = "Entries per page, default 20, max 100"),
        ("offset" = Option<u32>, Query, description = "Entries skipped from the newest"),
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Transaction history", body = HistoryResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "CSRF token required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "getLoyaltyHistory",
    security(("BearerAuth" = []))
)]
#[get("/loyalty/history")]
pub async fn get_history(
    state: web::Data<HttpState>,
    request: HttpRequest,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let caller = require_caller(&state, &request).await?;
    let query = query.into_inner();
    let page = HistoryPage::new(query.limit, query.offset);
    let transactions = state.loyalty_query.history(&caller.id, page).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(HistoryResponse {
            success: true,
            transactions: transactions
                .into_iter()
                .map(TransactionPayload::from)
                .collect(),
        }))
}

/// Spend points from the signed-in caller's balance.
#[utoipa::path(
    post,
    path = "/api/v1/loyalty/redemptions",
    request_body = RedemptionRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Points redeemed", body = RedemptionResponse),
        (status = 400, description = "Invalid or insufficient points", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "CSRF token required", body = ErrorSchema),
        (status = 404, description = "Caller has no loyalty account", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "redeemLoyaltyPoints",
    security(("BearerAuth" = []))
)]
#[post("/loyalty/redemptions")]
pub async fn redeem_points(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<RedemptionRequest>,
) -> ApiResult<HttpResponse> {
    let caller = require_caller(&state, &request).await?;
    let command = parse_redemption_request(caller.id, payload.into_inner())?;
    let outcome = state.loyalty.redeem_points(command).await?;
    Ok(HttpResponse::Ok().json(RedemptionResponse::from(outcome)))
}

/// Record a confirmed visit, earning points and evaluating the tier.
#[utoipa::path(
    post,
    path = "/api/v1/loyalty/visits",
    request_body = VisitRequest,
    params(
        ("X-CSRF-Token" = String, Header, description = "CSRF token from /api/v1/csrf-token")
    ),
    responses(
        (status = 200, description = "Visit recorded", body = VisitResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Barber or admin role required", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["loyalty"],
    operation_id = "recordLoyaltyVisit",
    security(("BearerAuth" = []))
)]
#[post("/loyalty/visits")]
pub async fn record_visit(
    state: web::Data<HttpState>,
    request: HttpRequest,
    payload: web::Json<VisitRequest>,
) -> ApiResult<HttpResponse> {
    require_staff(&state, &request).await?;
    let command = parse_visit_request(payload.into_inner())?;
    let outcome = state.loyalty.record_confirmed_visit(command).await?;
    Ok(HttpResponse::Ok().json(VisitResponse::from(outcome)))
}

#[cfg(test)]
#[path = "loyalty_tests.rs"]
mod tests;
