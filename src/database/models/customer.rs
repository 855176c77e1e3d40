use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub customer_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}
