//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::test::TestRequest;
use mockable::DefaultClock;

use crate::domain::ports::{
    FIXTURE_ADMIN_TOKEN, FIXTURE_BARBER_TOKEN, FIXTURE_CUSTOMER_TOKEN, FixtureIdentityProvider,
    InMemoryLoyaltyRepository, InMemoryLoyaltySettingsRepository,
};
use crate::domain::{CSRF_HEADER, CsrfPolicy, LoyaltyLedgerService, RequestAuthenticator};

use super::state::{CsrfCookieConfig, HttpState, HttpStatePorts};

/// A CSRF token long enough to pass header-only validation.
pub const TEST_CSRF_TOKEN: &str = "0b9c6b1e-52d5-4c0c-a1de-7d6f8a39e1f2";

/// Build handler state over in-memory stores and the fixture identity provider.
///
/// The CSRF cookie is issued without `Secure` so plain-HTTP tests can read it.
pub fn fixture_state() -> HttpState {
    let ledger = Arc::new(LoyaltyLedgerService::new(
        Arc::new(InMemoryLoyaltyRepository::new()),
        Arc::new(InMemoryLoyaltySettingsRepository::default()),
        Arc::new(DefaultClock),
    ));
    HttpState::new(
        HttpStatePorts {
            auth: Arc::new(RequestAuthenticator::new(
                Arc::new(FixtureIdentityProvider),
                CsrfPolicy::HeaderOnly,
            )),
            loyalty: ledger.clone(),
            loyalty_query: ledger.clone(),
            settings: ledger,
        },
        CsrfCookieConfig { secure: false },
    )
}

/// Attach a bearer token and a valid CSRF header.
pub fn authorised(request: TestRequest, token: &str) -> TestRequest {
    request
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .insert_header((CSRF_HEADER, TEST_CSRF_TOKEN))
}

/// Request signed in as the fixture administrator.
pub fn as_admin(request: TestRequest) -> TestRequest {
    authorised(request, FIXTURE_ADMIN_TOKEN)
}

/// Request signed in as the fixture barber.
pub fn as_barber(request: TestRequest) -> TestRequest {
    authorised(request, FIXTURE_BARBER_TOKEN)
}

/// Request signed in as the fixture customer.
pub fn as_customer(request: TestRequest) -> TestRequest {
    authorised(request, FIXTURE_CUSTOMER_TOKEN)
}
