use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::{self, Server};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::models::{
    Customer, CustomerCreated, ErrorBody, MessageBody, Order, OrderCreated, Payment, PaymentCreated, ProductRevenue,
    RecentOrder, Record, RecordCreated, RecordUpdated, TopCustomer,
};
use crate::handlers::{orders, records};
use crate::middleware::API_KEY_HEADER;

/// Path of the interactive explorer
pub const DOCS_PATH: &str = "/api-docs";

/// Path of the generated OpenAPI document
pub const OPENAPI_PATH: &str = "/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Records API",
        description = "CRUD and reporting over records, customers, orders and payments. \
                       Every `/api` route requires the `x-api-key` header.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        records::add_record,
        records::get_records,
        records::update_record,
        records::delete_record,
        orders::add_customer,
        orders::add_order,
        orders::add_payment,
        orders::top_customers,
        orders::recent_orders,
        orders::revenue_per_product,
    ),
    components(schemas(
        Customer,
        Order,
        Payment,
        Record,
        TopCustomer,
        RecentOrder,
        ProductRevenue,
        CustomerCreated,
        OrderCreated,
        PaymentCreated,
        RecordCreated,
        RecordUpdated,
        MessageBody,
        ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Records", description = "API for managing records"),
        (name = "Orders", description = "Customers, orders, payments and sales reports"),
    ),
    security(("ApiKeyAuth" = []))
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "ApiKeyAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

/// The OpenAPI document, advertising the configured base URL as its server
pub fn openapi_document(config: &AppConfig) -> openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.servers = Some(vec![Server::new(config.docs.base_url.clone())]);
    doc
}

/// Swagger UI plus the raw document; mounted outside the credential gate
pub fn swagger_ui(config: &AppConfig) -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, openapi_document(config))
}
