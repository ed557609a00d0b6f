//! Pool + migration integration tests against an on-disk database.

use voxway_db::{create_pool, run_migrations, DbSettings};

#[test]
fn pool_and_migrations_on_disk() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let db_path = dir.path().join("voxway.db");
    let db_path = db_path.to_str().expect("utf-8 path");

    let pool = create_pool(db_path, DbSettings::default()).expect("pool should build");

    {
        let conn = pool.get().expect("should get connection");
        let applied = run_migrations(&conn).expect("migrations should apply");
        assert!(applied >= 3);
    }

    // A second connection from the pool sees the migrated schema.
    let conn = pool.get().expect("should get second connection");
    conn.execute(
        "INSERT INTO access_keys (key_id, key_hash, tier) VALUES ('k1', 'h1', 'free')",
        [],
    )
    .expect("insert should succeed");

    let tier: String = conn
        .query_row(
            "SELECT tier FROM access_keys WHERE key_id = 'k1'",
            [],
            |row| row.get(0),
        )
        .expect("should read back");
    assert_eq!(tier, "free");
}

#[test]
fn tier_check_constraint_rejects_unknown_tier() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let db_path = dir.path().join("voxway.db");
    let pool = create_pool(db_path.to_str().expect("utf-8 path"), DbSettings::default())
        .expect("pool should build");
    let conn = pool.get().expect("should get connection");
    run_migrations(&conn).expect("migrations should apply");

    let result = conn.execute(
        "INSERT INTO access_keys (key_id, key_hash, tier) VALUES ('k2', 'h2', 'platinum')",
        [],
    );
    assert!(result.is_err(), "CHECK constraint should reject unknown tiers");
}
