//! Domain models for the visit ledger.

mod fee;
mod record;

pub use fee::*;
pub use record::*;
