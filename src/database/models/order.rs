use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub order_id: i32,
    pub customer_id: i32,
    /// Defaults to "Pending"
    pub status: String,
    pub order_date: NaiveDateTime,
}
