//! Clinic Visit Ledger Core
//!
//! Record store and fee-aggregation engine for a single-clinic patient-visit
//! ledger. Visits live in one human-diffable JSON document; this crate owns
//! persistence, identifier allocation, fee computation, and the filtering
//! and aggregation behind the list views and dashboard cards.
//!
//! # Modules
//!
//! - [`models`]: Domain types (VisitRecord, VisitSubmission, LineItem) and fee computation
//! - [`store`]: JSON-document record store with serialized, crash-safe writes
//! - [`query`]: Filtering, sorting, and count/fee aggregation
//! - [`form`]: Inbound form-field boundary (trimming, coercion, defaulting)
//!
//! The HTTP transport, routing, and HTML rendering live outside this crate;
//! they consume [`store::RecordStore`] snapshots and the structures in
//! [`query`].

pub mod form;
pub mod models;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use models::{LineItem, RejectReason, VisitRecord, VisitSubmission};
pub use query::{DashboardStats, RangeBucket, Totals};
pub use store::{AppendOutcome, RecordStore, StoreError, StoreResult};
