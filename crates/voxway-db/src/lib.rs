//! Database layer for the Voxway gateway.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! embedded SQL migrations, and nothing else — query helpers live with the
//! crates that own the tables (`voxway-quota` owns all three usage tables).
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a gateway instance owns its quota state; no
//!   external database process is required. WAL allows concurrent readers
//!   with a single writer, which matches the ledger access pattern.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management; ledger writes run on the blocking pool.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!` so the schema ships with the gateway and cannot drift
//!   from the code that depends on it.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbSettings, PoolError};
