//! CORS middleware for browser clients.
//!
//! Preflight `OPTIONS` requests are answered directly with a bare `200` and
//! the CORS headers; they never reach a handler or the authenticator. Every
//! other response gains the same headers on the way out.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use actix_web::HttpResponse;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::{CSRF_HEADER, TRACE_ID_HEADER};

const ANY_ORIGIN: &str = "*";
const ALLOWED_METHODS: &str = "GET, POST, PATCH, OPTIONS";

/// CORS middleware.
///
/// ```
/// use actix_web::App;
/// use barbershop_backend::middleware::Cors;
///
/// let app = App::new().wrap(Cors::new(Some("https://book.example.com".to_owned())));
/// ```
#[derive(Clone, Debug)]
pub struct Cors {
    headers: Rc<CorsHeaders>,
}

#[derive(Debug)]
struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_credentials: bool,
    allow_headers: HeaderValue,
    expose_headers: HeaderValue,
}

impl Cors {
    /// Allow `origin`, or any origin when `None`.
    ///
    /// An origin that is not a valid header value falls back to `*` with a
    /// warning.
    pub fn new(origin: Option<String>) -> Self {
        let specific = origin.and_then(|value| match HeaderValue::from_str(&value) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                warn!(%error, origin = %value, "invalid CORS origin; allowing any origin");
                None
            }
        });
        let allow_credentials = specific.is_some();
        let allow_origin = specific.unwrap_or_else(|| HeaderValue::from_static(ANY_ORIGIN));
        let allow_headers = format!(
            "authorization, x-client-info, apikey, content-type, {}, {}",
            CSRF_HEADER.to_ascii_lowercase(),
            TRACE_ID_HEADER
        );
        Self {
            headers: Rc::new(CorsHeaders {
                allow_origin,
                allow_credentials,
                allow_headers: HeaderValue::from_str(&allow_headers)
                    .unwrap_or_else(|_| HeaderValue::from_static("*")),
                expose_headers: HeaderValue::from_static(TRACE_ID_HEADER),
            }),
        }
    }

    /// Allow any origin without credentials.
    pub fn permissive() -> Self {
        Self::new(None)
    }
}

impl CorsHeaders {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, self.expose_headers.clone());
        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service,
            headers: Rc::clone(&self.headers),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: S,
    headers: Rc<CorsHeaders>,
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let headers = Rc::clone(&self.headers);
        if req.method() == Method::OPTIONS {
            let mut response = HttpResponse::Ok().finish();
            headers.apply(response.headers_mut());
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(ready(Ok(res)));
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            headers.apply(res.headers_mut());
            Ok(res.map_into_left_body())
        })
    }
}
