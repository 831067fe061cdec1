//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod auth;
pub mod cache_control;
pub mod csrf;
pub mod error;
pub mod health;
pub mod loyalty;
pub mod loyalty_dto;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, Scope, web};
use serde_json::json;

use crate::domain::Error;

pub use error::ApiResult;

fn json_payload_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid JSON body: {err}"))
        .with_details(json!({ "code": "invalid_body" }))
        .into()
}

fn query_payload_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {err}"))
        .with_details(json!({ "code": "invalid_query" }))
        .into()
}

/// Versioned API scope with every REST handler registered.
///
/// Malformed JSON bodies and query strings surface as `invalid_request`.
/// Callers supply [`state::HttpState`] as app data.
pub fn api_scope() -> Scope {
    web::scope("/api/v1")
        .app_data(web::JsonConfig::default().error_handler(json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(query_payload_error))
        .service(csrf::issue_csrf_token)
        .service(loyalty::apply_penalty)
        .service(loyalty::check_tier)
        .service(loyalty::get_stats)
        .service(loyalty::get_history)
        .service(loyalty::redeem_points)
        .service(loyalty::record_visit)
        .service(admin::record_transaction)
        .service(admin::get_settings)
        .service(admin::update_settings)
        .service(admin::get_overview)
}
