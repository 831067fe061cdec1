//! CSRF token issuance.
//!
//! ```text
//! POST /api/v1/csrf-token
//! ```
//!
//! The token travels in the response body and a `csrf-token` cookie. Nothing
//! is stored server-side; validation happens in the request authenticator.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, post, web};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{CSRF_COOKIE, CSRF_COOKIE_MAX_AGE_SECS, CsrfToken};
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::state::{CsrfCookieConfig, HttpState};

/// Response payload carrying a fresh CSRF token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    #[schema(example = "0b9c6b1e-52d5-4c0c-a1de-7d6f8a39e1f2")]
    pub csrf_token: String,
}

fn csrf_cookie(token: &CsrfToken, config: CsrfCookieConfig) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, token.as_str().to_owned())
        .path("/")
        .max_age(Duration::seconds(CSRF_COOKIE_MAX_AGE_SECS))
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .finish()
}

/// Issue a CSRF token for subsequent state-changing requests.
#[utoipa::path(
    post,
    path = "/api/v1/csrf-token",
    responses(
        (
            status = 200,
            description = "Fresh CSRF token",
            headers(("Set-Cookie" = String, description = "csrf-token cookie")),
            body = CsrfTokenResponse
        )
    ),
    tags = ["auth"],
    operation_id = "issueCsrfToken",
    security([])
)]
#[post("/csrf-token")]
pub async fn issue_csrf_token(state: web::Data<HttpState>) -> HttpResponse {
    let token = CsrfToken::issue();
    debug!("issued CSRF token");
    HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .cookie(csrf_cookie(&token, state.csrf_cookie))
        .json(CsrfTokenResponse {
            csrf_token: token.to_string(),
        })
}
