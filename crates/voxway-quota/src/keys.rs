//! Access key validation, hashing, and lookup.
//!
//! Keys are opaque strings with the `vk_` prefix. Only the SHA-256 hash
//! of the key material is stored; a leaked database does not leak usable
//! credentials.

use crate::error::AccessError;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use voxway_types::Tier;

/// Recognized access key prefix.
pub const KEY_PREFIX: &str = "vk_";

/// Minimum length of the random part after the prefix.
const MIN_KEY_BODY_LEN: usize = 8;

/// A resolved access key row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_id: String,
    pub tier: Tier,
    pub active: bool,
}

/// Validates the shape of a presented key without touching the store.
pub fn validate_key_format(raw_key: &str) -> Result<(), AccessError> {
    let body = raw_key
        .strip_prefix(KEY_PREFIX)
        .ok_or(AccessError::MalformedKey)?;
    if body.len() < MIN_KEY_BODY_LEN {
        return Err(AccessError::MalformedKey);
    }
    Ok(())
}

/// Hex-encoded SHA-256 of the raw key material.
pub fn hash_key(raw_key: &str) -> String {
    hex::encode(Sha256::digest(raw_key.as_bytes()))
}

/// Inserts a new access key row. Used by provisioning tooling and tests;
/// key issuance itself is outside the gateway.
pub fn provision_key(
    conn: &Connection,
    key_id: &str,
    raw_key: &str,
    tier: Tier,
) -> Result<(), AccessError> {
    validate_key_format(raw_key)?;
    conn.execute(
        "INSERT INTO access_keys (key_id, key_hash, tier) VALUES (?1, ?2, ?3)",
        rusqlite::params![key_id, hash_key(raw_key), tier.as_str()],
    )?;
    Ok(())
}

/// Deactivates a key without deleting its usage history.
pub fn deactivate_key(conn: &Connection, key_id: &str) -> Result<(), AccessError> {
    let changed = conn.execute(
        "UPDATE access_keys SET active = 0 WHERE key_id = ?1",
        [key_id],
    )?;
    if changed == 0 {
        return Err(AccessError::UnknownKey);
    }
    Ok(())
}

/// Resolves a presented key to its stored identity and tier.
///
/// Validates the format first so obviously malformed input never reaches
/// the store, then looks the hash up. A disabled key is reported
/// distinctly from an unknown one.
pub fn lookup_key(conn: &Connection, raw_key: &str) -> Result<KeyInfo, AccessError> {
    validate_key_format(raw_key)?;

    let row: Option<(String, String, bool)> = conn
        .query_row(
            "SELECT key_id, tier, active FROM access_keys WHERE key_hash = ?1",
            [hash_key(raw_key)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let (key_id, tier_label, active) = row.ok_or(AccessError::UnknownKey)?;

    let tier = Tier::parse(&tier_label)
        .ok_or_else(|| AccessError::Corrupt(format!("unrecognized tier label: {tier_label}")))?;

    if !active {
        return Err(AccessError::KeyDisabled);
    }

    Ok(KeyInfo {
        key_id,
        tier,
        active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        voxway_db::run_migrations(&conn).expect("migrations");
        conn
    }

    #[test]
    fn format_validation() {
        assert!(validate_key_format("vk_0123456789").is_ok());
        assert!(matches!(
            validate_key_format(""),
            Err(AccessError::MalformedKey)
        ));
        assert!(matches!(
            validate_key_format("sk_0123456789"),
            Err(AccessError::MalformedKey)
        ));
        assert!(matches!(
            validate_key_format("vk_short"),
            Err(AccessError::MalformedKey)
        ));
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let a = hash_key("vk_0123456789");
        let b = hash_key("vk_0123456789");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn provision_then_lookup() {
        let conn = test_conn();
        provision_key(&conn, "cust-1", "vk_customer_one", Tier::Professional)
            .expect("provision should succeed");

        let info = lookup_key(&conn, "vk_customer_one").expect("lookup should succeed");
        assert_eq!(info.key_id, "cust-1");
        assert_eq!(info.tier, Tier::Professional);
        assert!(info.active);
    }

    #[test]
    fn unknown_key_is_distinct_from_malformed() {
        let conn = test_conn();
        assert!(matches!(
            lookup_key(&conn, "vk_never_provisioned"),
            Err(AccessError::UnknownKey)
        ));
        assert!(matches!(
            lookup_key(&conn, "not-a-key"),
            Err(AccessError::MalformedKey)
        ));
    }

    #[test]
    fn deactivated_key_is_reported_disabled() {
        let conn = test_conn();
        provision_key(&conn, "cust-2", "vk_customer_two", Tier::Free).expect("provision");
        deactivate_key(&conn, "cust-2").expect("deactivate");
        assert!(matches!(
            lookup_key(&conn, "vk_customer_two"),
            Err(AccessError::KeyDisabled)
        ));
    }
}
