// Order management: customers, orders and payments are insert-only here;
// products and order lines are only read by the reports.

use std::collections::HashMap;

use axum::extract::{Query, State};
use serde_json::Value;

use crate::database::models::{
    CustomerCreated, ErrorBody, OrderCreated, PaymentCreated, ProductRevenue, RecentOrder, TopCustomer,
};
use crate::database::Statement;
use crate::middleware::ApiResult;
use crate::state::AppState;

use super::pipeline::{dispatch, Endpoint, Field, FieldKind, Outcome, Params};

pub const ADD_CUSTOMER: Endpoint = Endpoint {
    name: "addCustomer",
    fields: &[
        Field::required("name", FieldKind::Text),
        Field::required("email", FieldKind::Text),
        Field::with_default("phone", FieldKind::Text, None),
    ],
    build: insert_customer,
    outcome: Outcome::Created { key: "customer", message: "Customer added successfully!" },
};

pub const ADD_ORDER: Endpoint = Endpoint {
    name: "addOrder",
    fields: &[
        Field::required("customer_id", FieldKind::Integer),
        Field::with_default("status", FieldKind::Text, Some("Pending")),
    ],
    build: insert_order,
    outcome: Outcome::Created { key: "order", message: "Order added successfully!" },
};

pub const ADD_PAYMENT: Endpoint = Endpoint {
    name: "addPayment",
    fields: &[
        Field::required("order_id", FieldKind::Integer),
        Field::required("amount", FieldKind::Decimal),
        Field::required("payment_method", FieldKind::Text),
    ],
    build: insert_payment,
    outcome: Outcome::Created { key: "payment", message: "Payment added successfully!" },
};

pub const TOP_CUSTOMERS: Endpoint = Endpoint {
    name: "topCustomers",
    fields: &[],
    build: select_top_customers,
    outcome: Outcome::Rows,
};

pub const RECENT_ORDERS: Endpoint = Endpoint {
    name: "recentOrders",
    fields: &[],
    build: select_recent_orders,
    outcome: Outcome::Rows,
};

pub const REVENUE_PER_PRODUCT: Endpoint = Endpoint {
    name: "revenuePerProduct",
    fields: &[],
    build: select_revenue_per_product,
    outcome: Outcome::Rows,
};

fn insert_customer(p: &Params) -> Statement {
    Statement::returning("INSERT INTO customers (name, email, phone) VALUES ($1, $2, $3) RETURNING *")
        .bind(p.get("name"))
        .bind(p.get("email"))
        .bind(p.get("phone"))
}

fn insert_order(p: &Params) -> Statement {
    Statement::returning("INSERT INTO orders (customer_id, status) VALUES ($1, $2) RETURNING *")
        .bind(p.get("customer_id"))
        .bind(p.get("status"))
}

// Status is fixed at creation
fn insert_payment(p: &Params) -> Statement {
    Statement::returning(
        "INSERT INTO payments (order_id, amount, payment_method, status) \
         VALUES ($1, $2::numeric, $3, 'Completed') RETURNING *",
    )
    .bind(p.get("order_id"))
    .bind(p.get("amount"))
    .bind(p.get("payment_method"))
}

fn select_top_customers(_: &Params) -> Statement {
    Statement::select(
        "SELECT c.name AS customer_name, COUNT(o.order_id) AS total_orders \
         FROM customers c \
         JOIN orders o ON c.customer_id = o.customer_id \
         GROUP BY c.customer_id, c.name \
         ORDER BY total_orders DESC, c.customer_id \
         LIMIT 3",
    )
}

fn select_recent_orders(_: &Params) -> Statement {
    Statement::select(
        "SELECT o.order_id, c.name AS customer_name, o.order_date, o.status \
         FROM orders o \
         JOIN customers c ON o.customer_id = c.customer_id \
         WHERE o.order_date >= NOW() - INTERVAL '30 days' \
         ORDER BY o.order_date DESC",
    )
}

fn select_revenue_per_product(_: &Params) -> Statement {
    Statement::select(
        "SELECT p.product_id, p.name AS product_name, \
                COALESCE(SUM(op.quantity), 0) AS total_quantity_sold, \
                COALESCE(SUM(op.subtotal), 0) AS total_revenue \
         FROM products p \
         LEFT JOIN order_products op ON p.product_id = op.product_id \
         GROUP BY p.product_id, p.name \
         ORDER BY total_revenue DESC, p.product_id",
    )
}

/// POST /api/orders/addCustomer - Add a new customer
#[utoipa::path(
    post,
    path = "/api/orders/addCustomer",
    tag = "Orders",
    params(
        ("name" = String, Query, description = "Customer name"),
        ("email" = String, Query, description = "Customer email"),
        ("phone" = Option<String>, Query, description = "Customer phone number"),
    ),
    responses(
        (status = 201, description = "Customer added successfully", body = CustomerCreated),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn add_customer(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&ADD_CUSTOMER, state.store.as_ref(), &query).await
}

/// POST /api/orders/addOrder - Add a new order for a customer
#[utoipa::path(
    post,
    path = "/api/orders/addOrder",
    tag = "Orders",
    params(
        ("customer_id" = i32, Query, description = "ID of the customer"),
        ("status" = Option<String>, Query, description = "Order status, defaults to Pending"),
    ),
    responses(
        (status = 201, description = "Order added successfully", body = OrderCreated),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error, including an unknown customer", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn add_order(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&ADD_ORDER, state.store.as_ref(), &query).await
}

/// POST /api/orders/addPayment - Add a completed payment for an order
#[utoipa::path(
    post,
    path = "/api/orders/addPayment",
    tag = "Orders",
    params(
        ("order_id" = i32, Query, description = "ID of the order"),
        ("amount" = f64, Query, description = "Amount paid"),
        ("payment_method" = String, Query, description = "Payment method"),
    ),
    responses(
        (status = 201, description = "Payment added successfully", body = PaymentCreated),
        (status = 400, description = "Missing required fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error, including an unknown order", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn add_payment(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&ADD_PAYMENT, state.store.as_ref(), &query).await
}

/// GET /api/orders/topCustomers - The three customers with the most orders
#[utoipa::path(
    get,
    path = "/api/orders/topCustomers",
    tag = "Orders",
    responses(
        (status = 200, description = "Top customers retrieved", body = [TopCustomer]),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn top_customers(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&TOP_CUSTOMERS, state.store.as_ref(), &query).await
}

/// GET /api/orders/recentOrders - Orders placed in the last 30 days, newest first
#[utoipa::path(
    get,
    path = "/api/orders/recentOrders",
    tag = "Orders",
    responses(
        (status = 200, description = "Recent orders retrieved", body = [RecentOrder]),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn recent_orders(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&RECENT_ORDERS, state.store.as_ref(), &query).await
}

/// GET /api/orders/revenuePerProduct - Quantity sold and revenue for every product
#[utoipa::path(
    get,
    path = "/api/orders/revenuePerProduct",
    tag = "Orders",
    responses(
        (status = 200, description = "Revenue per product calculated", body = [ProductRevenue]),
        (status = 401, description = "Missing or invalid API key", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    security(("ApiKeyAuth" = []))
)]
pub async fn revenue_per_product(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    dispatch(&REVENUE_PER_PRODUCT, state.store.as_ref(), &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn customer_phone_defaults_to_null() {
        let params = ADD_CUSTOMER
            .extract(&query(&[("name", "Ada"), ("email", "ada@example.com")]))
            .unwrap();
        let st = (ADD_CUSTOMER.build)(&params);
        assert_eq!(st.params, vec![json!("Ada"), json!("ada@example.com"), Value::Null]);
    }

    #[test]
    fn order_status_defaults_to_pending() {
        let params = ADD_ORDER.extract(&query(&[("customer_id", "4")])).unwrap();
        assert_eq!((ADD_ORDER.build)(&params).params, vec![json!(4), json!("Pending")]);

        let params = ADD_ORDER
            .extract(&query(&[("customer_id", "4"), ("status", "Shipped")]))
            .unwrap();
        assert_eq!((ADD_ORDER.build)(&params).params, vec![json!(4), json!("Shipped")]);
    }

    #[test]
    fn payment_requires_all_three_fields() {
        let err = ADD_PAYMENT.extract(&query(&[("order_id", "1")])).unwrap_err();
        assert_eq!(err.message(), "Missing required fields: amount, payment_method");
    }

    #[test]
    fn payment_amount_keeps_its_decimal_text() {
        let params = ADD_PAYMENT
            .extract(&query(&[("order_id", "1"), ("amount", "10.50"), ("payment_method", "card")]))
            .unwrap();
        let st = (ADD_PAYMENT.build)(&params);
        assert!(st.sql.contains("'Completed'"));
        assert_eq!(st.params, vec![json!(1), json!("10.50"), json!("card")]);
    }

    #[test]
    fn reports_take_no_parameters() {
        for endpoint in [TOP_CUSTOMERS, RECENT_ORDERS, REVENUE_PER_PRODUCT] {
            let params = endpoint.extract(&query(&[("ignored", "x")])).unwrap();
            assert!((endpoint.build)(&params).params.is_empty());
        }
        let st = (TOP_CUSTOMERS.build)(&Params::default());
        assert!(st.sql.ends_with("LIMIT 3"));
    }
}
