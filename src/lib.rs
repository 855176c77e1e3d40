pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::middleware::api_key_middleware;
pub use crate::state::AppState;

/// Full application router.
///
/// `/api/*` sits behind the credential gate; `/health` and the documentation
/// routes do not.
pub fn app(state: AppState) -> Router {
    let gated = Router::new()
        .merge(records_routes())
        .merge(orders_routes())
        .route_layer(from_fn_with_state(state.clone(), api_key_middleware));

    Router::new()
        .route("/health", get(handlers::health::health))
        .merge(gated)
        .merge(api::swagger_ui(&state.config))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn records_routes() -> Router<AppState> {
    use handlers::records;

    Router::new()
        .route("/api/records/addRecord", post(records::add_record))
        .route("/api/records/getRecords", get(records::get_records))
        .route("/api/records/updateRecord", put(records::update_record))
        .route("/api/records/deleteRecord", delete(records::delete_record))
}

fn orders_routes() -> Router<AppState> {
    use handlers::orders;

    Router::new()
        // Inserts
        .route("/api/orders/addCustomer", post(orders::add_customer))
        .route("/api/orders/addOrder", post(orders::add_order))
        .route("/api/orders/addPayment", post(orders::add_payment))
        // Reports
        .route("/api/orders/topCustomers", get(orders::top_customers))
        .route("/api/orders/recentOrders", get(orders::recent_orders))
        .route("/api/orders/revenuePerProduct", get(orders::revenue_per_product))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        // No allowed origins: browsers get no CORS headers
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<_> = security.cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
