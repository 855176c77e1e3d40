use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub payment_id: i32,
    pub order_id: i32,
    pub amount: f64,
    pub payment_method: String,
    /// Always "Completed" for payments created through the API
    pub status: String,
    pub payment_date: NaiveDateTime,
}
