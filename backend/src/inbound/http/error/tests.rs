//! Tests for HTTP error rendering.

use super::*;
use actix_web::body::to_bytes;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> TraceId {
    TRACE_ID.parse().expect("valid UUID")
}

async fn render(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = error.error_response();
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .map(|value| value.to_str().expect("ASCII header").to_owned());
    let bytes = to_bytes(response.into_body()).await.expect("body");
    let body = serde_json::from_slice(&bytes).expect("JSON body");
    (status, header, body)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("stale"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn each_code_has_its_own_status(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(err.status_code(), status);
}

#[rstest]
#[actix_web::test]
async fn internal_failures_hide_message_and_details(trace_id: TraceId) {
    let error = Error::internal("pool exhausted on replica 2")
        .with_trace_id(trace_id)
        .with_details(json!({ "query": "SELECT 1" }));

    let (status, header, body) = render(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "Internal server error",
            "code": "internal_error",
            "traceId": TRACE_ID,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn redemption_rejection_keeps_its_details(trace_id: TraceId) {
    let error = Error::invalid_request("Insufficient points")
        .with_trace_id(trace_id)
        .with_details(json!({
            "code": "insufficient_points",
            "requested": 50,
            "available": 40,
        }));

    let (status, _, body) = render(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Insufficient points");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["available"], 40);
}

#[rstest]
#[actix_web::test]
async fn untraced_errors_omit_header_and_optional_fields() {
    let (_, header, body) = render(&Error::conflict("account changed concurrently")).await;

    assert!(header.is_none());
    assert_eq!(body["code"], "conflict");
    assert!(body.get("traceId").is_none());
    assert!(body.get("details").is_none());
}

#[rstest]
fn actix_errors_become_generic_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert!(err.trace_id().is_none());
    assert!(err.details().is_none());
}
