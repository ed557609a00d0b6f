//! Atomic quota reservation and outcome bookkeeping.
//!
//! The reservation is the single concurrency-sensitive operation in the
//! gateway: two concurrent reserves against a key with one remaining unit
//! must produce exactly one success. This is enforced by running the
//! rollover-and-increment inside an `IMMEDIATE` transaction (taking the
//! write lock up front) with the increment guarded by
//! `calls_today < daily_limit`, so admission is decided by SQLite's write
//! serialization, never by a read-then-write race.

use crate::error::AccessError;
use crate::keys;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use voxway_types::{GatewayPolicy, ProvidersUsed, RunOutcome, Tier, UsageRecord};

/// One consumed quota unit, produced by a successful reserve.
///
/// Holds the post-increment counter state so callers can report usage
/// without a second read.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub key_id: String,
    pub tier: Tier,
    pub daily_limit: u32,
    /// Counter value after this reservation's increment.
    pub calls_today: u32,
    /// UTC day the reservation was charged against.
    pub window_start: NaiveDate,
}

/// The UTC instant the window that covers `day` rolls over.
pub fn window_reset_instant(day: NaiveDate) -> DateTime<Utc> {
    let next = day.succ_opt().unwrap_or(day);
    let midnight = next.and_hms_opt(0, 0, 0).expect("midnight is a valid time");
    Utc.from_utc_datetime(&midnight)
}

/// Validates the key, rolls the window if the UTC date advanced, and
/// consumes one quota unit — all as a single atomic step.
///
/// `today` is injected so the rollover logic is testable without clock
/// control; the [`crate::UsageLedger`] service passes the wall-clock UTC
/// date.
pub fn reserve_on(
    conn: &mut Connection,
    policy: &GatewayPolicy,
    raw_key: &str,
    today: NaiveDate,
) -> Result<Reservation, AccessError> {
    // Key resolution happens outside the write transaction: an invalid or
    // unknown key must not take the write lock at all.
    let info = keys::lookup_key(conn, raw_key)?;
    let daily_limit = policy.daily_limit(info.tier);
    let today_str = today.to_string();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // First request for this key creates its window row.
    tx.execute(
        "INSERT INTO usage_records (key_id, calls_today, window_start)
         VALUES (?1, 0, ?2)
         ON CONFLICT (key_id) DO NOTHING",
        rusqlite::params![info.key_id, today_str],
    )?;

    // Reset-then-increment on a new UTC day, as one transaction. ISO dates
    // compare correctly as text.
    tx.execute(
        "UPDATE usage_records
         SET calls_today = 0, window_start = ?2, updated_at = datetime('now')
         WHERE key_id = ?1 AND window_start < ?2",
        rusqlite::params![info.key_id, today_str],
    )?;

    // The guard is the admission decision: zero rows changed means the
    // window is already full.
    let admitted = tx.execute(
        "UPDATE usage_records
         SET calls_today = calls_today + 1, updated_at = datetime('now')
         WHERE key_id = ?1 AND calls_today < ?2",
        rusqlite::params![info.key_id, daily_limit],
    )?;

    if admitted == 0 {
        // Roll back the (possibly applied) rollover together with nothing
        // else; the failed attempt leaves the store untouched.
        tx.rollback()?;
        return Err(AccessError::QuotaExceeded {
            resets_at: window_reset_instant(today),
        });
    }

    let calls_today: u32 = tx.query_row(
        "SELECT calls_today FROM usage_records WHERE key_id = ?1",
        [&info.key_id],
        |row| row.get(0),
    )?;

    tx.commit()?;

    tracing::debug!(
        key_id = %info.key_id,
        calls_today,
        daily_limit,
        "reserved one quota unit"
    );

    Ok(Reservation {
        key_id: info.key_id,
        tier: info.tier,
        daily_limit,
        calls_today,
        window_start: today,
    })
}

/// Appends the terminal outcome of a reserved attempt.
///
/// Informational bookkeeping only: the reserved count is never adjusted
/// here, and retried failures are not refunded.
pub fn record_outcome_on(
    conn: &Connection,
    reservation: &Reservation,
    outcome: RunOutcome,
    providers: Option<&ProvidersUsed>,
) -> Result<(), AccessError> {
    conn.execute(
        "INSERT INTO usage_outcomes (key_id, outcome, stt_provider, ai_provider, tts_provider)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            reservation.key_id,
            outcome.as_str(),
            providers.map(|p| p.stt.as_str()),
            providers.map(|p| p.ai.as_str()),
            providers.map(|p| p.tts.as_str()),
        ],
    )?;
    Ok(())
}

/// Read-only usage projection for a key.
///
/// A window from a past UTC day is projected as zero calls for `today`
/// without mutating the stored row; the actual advance happens on the
/// next reserve.
pub fn peek_on(
    conn: &Connection,
    policy: &GatewayPolicy,
    raw_key: &str,
    today: NaiveDate,
) -> Result<UsageRecord, AccessError> {
    let info = keys::lookup_key(conn, raw_key)?;
    let daily_limit = policy.daily_limit(info.tier);

    let row: Option<(u32, String)> = conn
        .query_row(
            "SELECT calls_today, window_start FROM usage_records WHERE key_id = ?1",
            [&info.key_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (calls_today, window_start) = match row {
        Some((calls, start_str)) => {
            let start: NaiveDate = start_str
                .parse()
                .map_err(|_| AccessError::Corrupt(format!("bad window date: {start_str}")))?;
            if start < today {
                (0, today)
            } else {
                (calls, start)
            }
        }
        // Key exists but has never reserved.
        None => (0, today),
    };

    Ok(UsageRecord {
        access_key_id: info.key_id,
        tier: info.tier,
        daily_limit,
        calls_today,
        window_start,
    })
}
