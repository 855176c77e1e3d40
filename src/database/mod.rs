pub mod executor;
pub mod manager;
pub mod models;

pub use executor::{QueryExecutor, QueryOutcome, Statement, StatementKind};
pub use manager::{DatabaseError, DatabaseManager};
