//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (loyalty, admin,
//!   CSRF issuance, health)
//! - **Schemas**: request/response DTOs plus the error wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that describe domain types without
//!   coupling them to utoipa
//! - **Security**: bearer token authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::csrf::CsrfTokenResponse;
use crate::inbound::http::loyalty_dto::{
    HistoryResponse, OverviewResponse, PenaltyRequest, PenaltyResponse, RedemptionRequest,
    RedemptionResponse, SettingsPatchRequest, SettingsPayload, SettingsResponse, StatsPayload,
    StatsResponse, TierCheckResponse, TierDistributionPayload, TransactionPayload,
    TransactionRequest, TransactionResponse, VisitRequest, VisitResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Access token issued by the identity service. State-changing \
                         and personal endpoints also require the X-CSRF-Token header.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Barbershop loyalty API",
        description = "Loyalty ledger for barbershop customers: visits, points, tiers, \
                       penalties and administrator settings."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::csrf::issue_csrf_token,
        crate::inbound::http::loyalty::apply_penalty,
        crate::inbound::http::loyalty::check_tier,
        crate::inbound::http::loyalty::get_stats,
        crate::inbound::http::loyalty::get_history,
        crate::inbound::http::loyalty::redeem_points,
        crate::inbound::http::loyalty::record_visit,
        crate::inbound::http::admin::record_transaction,
        crate::inbound::http::admin::get_settings,
        crate::inbound::http::admin::update_settings,
        crate::inbound::http::admin::get_overview,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CsrfTokenResponse,
        PenaltyRequest,
        PenaltyResponse,
        TierCheckResponse,
        StatsPayload,
        StatsResponse,
        TransactionPayload,
        HistoryResponse,
        RedemptionRequest,
        RedemptionResponse,
        VisitRequest,
        VisitResponse,
        TransactionRequest,
        TransactionResponse,
        SettingsPayload,
        SettingsResponse,
        SettingsPatchRequest,
        TierDistributionPayload,
        OverviewResponse,
    )),
    tags(
        (name = "auth", description = "CSRF token issuance"),
        (name = "loyalty", description = "Customer loyalty ledger"),
        (name = "admin", description = "Administrator ledger operations and settings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "error");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/v1/csrf-token")]
    #[case("/api/v1/loyalty/penalties")]
    #[case("/api/v1/loyalty/tier-check")]
    #[case("/api/v1/loyalty/stats")]
    #[case("/api/v1/loyalty/history")]
    #[case("/api/v1/loyalty/redemptions")]
    #[case("/api/v1/loyalty/visits")]
    #[case("/api/v1/admin/loyalty/transactions")]
    #[case("/api/v1/admin/loyalty/settings")]
    #[case("/api/v1/admin/loyalty/overview")]
    #[case("/health/ready")]
    fn openapi_documents_endpoint(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
