//! The async ledger service wrapping the connection pool.

use crate::error::AccessError;
use crate::ledger::{self, Reservation};
use chrono::Utc;
use voxway_db::DbPool;
use voxway_types::{GatewayPolicy, ProvidersUsed, RunOutcome, UsageRecord};

/// Process-wide usage ledger.
///
/// Created once at startup and injected into the orchestrator; all access
/// goes through `reserve` / `commit` / `peek`. Database work runs on the
/// blocking pool — the async caller never holds a connection across an
/// await point.
#[derive(Clone)]
pub struct UsageLedger {
    pool: DbPool,
    policy: GatewayPolicy,
}

impl UsageLedger {
    pub fn new(pool: DbPool, policy: GatewayPolicy) -> Self {
        Self { pool, policy }
    }

    /// The policy this ledger enforces.
    pub fn policy(&self) -> &GatewayPolicy {
        &self.policy
    }

    /// Consumes one quota unit for the key, atomically.
    ///
    /// See [`ledger::reserve_on`] for the admission semantics. Invalid and
    /// unknown keys fail without consuming anything.
    pub async fn reserve(&self, raw_key: &str) -> Result<Reservation, AccessError> {
        let pool = self.pool.clone();
        let policy = self.policy.clone();
        let key = raw_key.to_string();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| AccessError::Pool(e.to_string()))?;
            ledger::reserve_on(&mut conn, &policy, &key, Utc::now().date_naive())
        })
        .await
        .map_err(|e| AccessError::Task(e.to_string()))?
    }

    /// Records the terminal outcome of a reserved attempt.
    ///
    /// Bookkeeping only — never adjusts the reserved count. Callers treat
    /// failures here as log-and-continue; a lost analytics row must not
    /// fail a finished pipeline run.
    pub async fn commit(
        &self,
        reservation: &Reservation,
        outcome: RunOutcome,
        providers: Option<ProvidersUsed>,
    ) -> Result<(), AccessError> {
        let pool = self.pool.clone();
        let reservation = reservation.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| AccessError::Pool(e.to_string()))?;
            ledger::record_outcome_on(&conn, &reservation, outcome, providers.as_ref())
        })
        .await
        .map_err(|e| AccessError::Task(e.to_string()))?
    }

    /// Read-only usage projection for the key's current UTC window.
    pub async fn peek(&self, raw_key: &str) -> Result<UsageRecord, AccessError> {
        let pool = self.pool.clone();
        let policy = self.policy.clone();
        let key = raw_key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get().map_err(|e| AccessError::Pool(e.to_string()))?;
            ledger::peek_on(&conn, &policy, &key, Utc::now().date_naive())
        })
        .await
        .map_err(|e| AccessError::Task(e.to_string()))?
    }
}
