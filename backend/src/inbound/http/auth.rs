//! Authentication helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! credential extraction and role gates here.

use actix_web::HttpRequest;
use actix_web::http::header;

use crate::domain::{AuthRequest, AuthenticatedCaller, CSRF_COOKIE, CSRF_HEADER, Error, Role};

use super::ApiResult;
use super::state::HttpState;

/// Collect the credentials the authenticator consults from `request`.
pub fn auth_request(request: &HttpRequest) -> AuthRequest {
    let header_text = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    AuthRequest {
        authorization: header_text(header::AUTHORIZATION.as_str()),
        csrf_header: header_text(CSRF_HEADER),
        csrf_cookie: request
            .cookie(CSRF_COOKIE)
            .map(|cookie| cookie.value().to_owned()),
    }
}

/// Authenticate any signed-in caller.
pub async fn require_caller(
    state: &HttpState,
    request: &HttpRequest,
) -> ApiResult<AuthenticatedCaller> {
    state.auth.authenticate(&auth_request(request), None).await
}

/// Authenticate a caller holding [`Role::Admin`].
pub async fn require_admin(
    state: &HttpState,
    request: &HttpRequest,
) -> ApiResult<AuthenticatedCaller> {
    state.auth.authenticate_admin(&auth_request(request)).await
}

/// Authenticate a member of staff: a barber or an admin.
pub async fn require_staff(
    state: &HttpState,
    request: &HttpRequest,
) -> ApiResult<AuthenticatedCaller> {
    let caller = require_caller(state, request).await?;
    ensure_staff(caller)
}

fn ensure_staff(caller: AuthenticatedCaller) -> ApiResult<AuthenticatedCaller> {
    if caller.has_role(Role::Barber) || caller.has_role(Role::Admin) {
        Ok(caller)
    } else {
        Err(Error::forbidden(
            "Authentication failed: Unauthorized: barber or admin role required",
        ))
    }
}
