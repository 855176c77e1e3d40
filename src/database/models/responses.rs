//! Response envelopes, described for the OpenAPI document

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Customer, Order, Payment, Record};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerCreated {
    pub message: String,
    pub customer: Customer,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderCreated {
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentCreated {
    pub message: String,
    pub payment: Payment,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordCreated {
    pub message: String,
    #[serde(rename = "Record")]
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordUpdated {
    pub message: String,
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

/// Every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}
