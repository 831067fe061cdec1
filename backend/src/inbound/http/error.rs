//! Rendering of domain errors as HTTP responses.
//!
//! Every failure leaves the API as
//! `{success: false, error, code, traceId?, details?}` with a status derived
//! from the [`ErrorCode`]. Internal errors are logged in full and replaced by
//! a generic message before they reach the client.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, TraceId};

pub use crate::domain::ApiResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope<'a> {
    success: bool,
    error: &'a str,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<TraceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl<'a> ErrorEnvelope<'a> {
    fn for_client(error: &'a Error) -> Self {
        let internal = error.code() == ErrorCode::InternalError;
        if internal {
            error!(
                message = error.message(),
                details = ?error.details(),
                "internal error redacted from response"
            );
        }
        Self {
            success: false,
            error: if internal {
                ErrorCode::InternalError.fallback_message()
            } else {
                error.message()
            },
            code: error.code(),
            trace_id: error.trace_id(),
            details: if internal { None } else { error.details() },
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        response.json(ErrorEnvelope::for_client(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(ErrorCode::InternalError.fallback_message())
    }
}

#[cfg(test)]
mod tests;
