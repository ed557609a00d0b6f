//! Router-level test for the health endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use voxway_pipeline::Orchestrator;
use voxway_providers::ProviderRegistry;
use voxway_quota::UsageLedger;
use voxway_safety::SafetyGate;
use voxway_server::{app, AppState};
use voxway_types::GatewayPolicy;

fn empty_state(dir: &tempfile::TempDir) -> AppState {
    let db_path = dir.path().join("health.db");
    let pool = voxway_db::create_pool(
        db_path.to_str().expect("utf-8 path"),
        voxway_db::DbSettings::default(),
    )
    .expect("pool");
    {
        let conn = pool.get().expect("connection");
        voxway_db::run_migrations(&conn).expect("migrations");
    }

    let registry = Arc::new(ProviderRegistry::new());
    let ledger = UsageLedger::new(pool.clone(), GatewayPolicy::default());
    let orchestrator =
        Orchestrator::new(registry.clone(), Arc::new(SafetyGate::new()), ledger.clone());

    AppState {
        pool,
        registry,
        ledger,
        orchestrator,
    }
}

#[tokio::test]
async fn health_check_returns_ok() {
    let dir = tempfile::tempdir().expect("temp dir");
    let app = app(empty_state(&dir));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
