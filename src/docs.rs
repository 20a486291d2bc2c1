// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::{handlers, models, services};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Movimentações ---
        handlers::movements::create_movement,
        handlers::movements::list_product_movements,

        // --- Produtos ---
        handlers::products::create_product,
        handlers::products::create_product_batch,
        handlers::products::get_unit_locations,
        handlers::products::list_product_units,
    ),
    components(
        schemas(
            models::catalog::MovementType,
            models::movement::Movement,
            models::movement::CreateMovementPayload,
            models::movement::MovementCreated,
            models::product::Product,
            models::product::UnitLocation,
            models::unit::Unit,

            // --- Payloads ---
            handlers::products::ProductBasePayload,
            handlers::products::CreateProductPayload,
            handlers::products::CreateProductBatchPayload,
            handlers::products::ProductBatchCreated,
            services::variant_generator::VariantOptions,
        )
    ),
    tags(
        (name = "Inventory", description = "Razão de movimentações, unidades serializadas e variantes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/inventory/movements",
            "/api/inventory/products",
            "/api/inventory/products/batch",
            "/api/inventory/products/{id}/locations",
            "/api/inventory/products/{id}/units",
            "/api/inventory/products/{id}/movements",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {path}");
        }
    }
}
