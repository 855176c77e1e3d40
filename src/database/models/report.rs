use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row of the top-customers report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopCustomer {
    pub customer_name: String,
    pub total_orders: i64,
}

/// Row of the recent-orders report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentOrder {
    pub order_id: i32,
    pub customer_name: String,
    pub order_date: NaiveDateTime,
    pub status: String,
}

/// Row of the revenue-per-product report; products without order lines report zeros
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRevenue {
    pub product_id: i32,
    pub product_name: String,
    pub total_quantity_sold: i64,
    pub total_revenue: f64,
}
