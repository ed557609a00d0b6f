//! Access control and usage accounting for the Voxway gateway.
//!
//! Two layers, following the workspace convention:
//!
//! - Synchronous query helpers taking a [`rusqlite::Connection`]
//!   ([`keys`], [`ledger`]) — these own the SQL and the atomicity
//!   guarantees.
//! - The async [`UsageLedger`] service, which wraps the connection pool,
//!   runs the helpers on the blocking pool, and is the only interface the
//!   rest of the gateway touches. It is created once at startup and
//!   injected — never ambient global state.
//!
//! Quota semantics: every attempt consumes one unit at `reserve` time,
//! before the pipeline runs, so a crash mid-pipeline still counts.
//! `commit` records the terminal outcome for analytics and never adjusts
//! the reserved count; failed runs are not refunded.

mod error;
pub mod keys;
pub mod ledger;
mod service;

pub use error::AccessError;
pub use ledger::Reservation;
pub use service::UsageLedger;
