//! Row shapes as the store returns them. Handlers pass rows through as JSON;
//! these types describe them for the OpenAPI document and for tests.

pub mod customer;
pub mod order;
pub mod payment;
pub mod record;
pub mod report;
pub mod responses;

pub use customer::Customer;
pub use order::Order;
pub use payment::Payment;
pub use record::Record;
pub use report::{ProductRevenue, RecentOrder, TopCustomer};
pub use responses::{
    CustomerCreated, ErrorBody, MessageBody, OrderCreated, PaymentCreated, RecordCreated, RecordUpdated,
};
