//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single OpenAPI spec served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "HS256 bearer token. Signed with CADASTRO_JWT_SECRET.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cadastro API — Customer Registry",
        description = "REST backend for managing customers and their addresses: create, update, list, remove, existence checks, and credential validation.\n\nAuthentication: `Authorization: Bearer <token>` on every `/customer` route except `POST /customer/credentials` and `POST /customer/exists`.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    paths(
        crate::routes::customers::create_customer,
        crate::routes::customers::update_customer,
        crate::routes::customers::list_customers,
        crate::routes::customers::remove_customer,
        crate::routes::customers::validate_credentials,
        crate::routes::customers::customer_exists,
        crate::routes::addresses::replace_addresses,
        crate::routes::addresses::remove_addresses,
    ),
    components(schemas(
        crate::error::ErrorsBody,
        crate::error::MessageBody,
        crate::routes::customers::CreateCustomerRequest,
        crate::routes::customers::UpdateCustomerRequest,
        crate::routes::customers::CredentialsRequest,
        crate::routes::customers::ExistsRequest,
        crate::routes::addresses::ReplaceAddressesRequest,
        crate::routes::addresses::RemoveAddressesRequest,
        crate::service::CustomerView,
        crate::service::AddressView,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "customers", description = "Customer lifecycle and credentials"),
        (name = "addresses", description = "Addresses owned by a customer"),
    )
)]
struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
