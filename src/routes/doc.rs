use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::receipts::{ColorChannels, ReceiptFields},
    models::{Product, User},
    response::{ApiResponse, ErrorBody, MessageResponse},
    routes::{health, pages, products, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        pages::home,
        products::list_products,
        products::edit_product_form,
        products::delete_product,
        users::list_users,
        users::edit_user_form,
        users::delete_user
    ),
    components(
        schemas(
            User,
            Product,
            ReceiptFields,
            ColorChannels,
            MessageResponse,
            ErrorBody,
            health::HealthData,
            ApiResponse<health::HealthData>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Pages", description = "HTML pages"),
        (name = "Products", description = "Product pages and endpoints"),
        (name = "Users", description = "User pages and endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
