//! Usage accounting types.

use crate::Tier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-key daily usage state as projected from the ledger.
///
/// `calls_today` never exceeds `daily_limit` after a ledger commit, and
/// `window_start` advances exactly once per UTC calendar day, resetting
/// `calls_today` to zero atomically with the advance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub access_key_id: String,
    pub tier: Tier,
    pub daily_limit: u32,
    pub calls_today: u32,
    /// UTC day this window covers.
    pub window_start: NaiveDate,
}

impl UsageRecord {
    /// Units left in the current window.
    pub fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.calls_today)
    }
}

/// Terminal outcome of one voice-processing attempt, recorded for
/// analytics only. Every attempt consumes quota regardless of outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// All five stages completed.
    Completed,
    /// A safety checkpoint stopped the run.
    Blocked,
    /// A stage failed (provider error, bad audio, timeout).
    Failed,
}

impl RunOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
        }
    }
}
