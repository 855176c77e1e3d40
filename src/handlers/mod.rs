// handlers/mod.rs - Route handlers
//
// records: full lifecycle for the generic `records` table
// orders:  customers, orders, payments and the sales reports
// health:  public liveness check
//
// Every records/orders handler is a thin wrapper over `pipeline::dispatch`.

pub mod health;
pub mod orders;
pub mod pipeline;
pub mod records;

pub use pipeline::{dispatch, Endpoint, Field, FieldKind, Outcome, Params, Presence};
