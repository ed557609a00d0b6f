//! Voxway server library logic.

pub mod api_ws;
pub mod config;
pub mod mapper;
pub mod rpc;

use axum::{extract::DefaultBodyLimit, routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use voxway_db::DbPool;
use voxway_pipeline::Orchestrator;
use voxway_providers::{
    ChatCompletionsAi, PiperTts, ProviderRegistry, SpeechApiTts, WhisperApiStt, WhisperCppStt,
};
use voxway_quota::UsageLedger;
use voxway_types::ProviderRole;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Provider registry (read-only after startup).
    pub registry: Arc<ProviderRegistry>,
    /// Usage ledger service.
    pub ledger: UsageLedger,
    /// The pipeline orchestrator.
    pub orchestrator: Orchestrator,
}

/// Maximum HTTP request body size (1 MiB). The voice payload rides the
/// WebSocket channel, not an HTTP body.
const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Health check handler.
///
/// Returns `200 OK` with server status and version. Used by load
/// balancers, monitoring, and CI to verify the server is running.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the provider registry from configuration.
///
/// The HTTP providers are always registered; their calls fail with a
/// configuration error when `VOXWAY_OPENAI_API_KEY` (fallback:
/// `OPENAI_API_KEY`) is unset. Local subprocess providers are registered
/// only when both their binary and model paths are configured. Per-role
/// defaults from the config are applied last.
pub fn build_registry(
    providers: &config::ProvidersConfig,
) -> Result<ProviderRegistry, voxway_providers::RegistryError> {
    let api_key = std::env::var("VOXWAY_OPENAI_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .unwrap_or_default();

    let mut registry = ProviderRegistry::new();

    registry.register_stt(Arc::new(WhisperApiStt::new(
        &providers.openai_base_url,
        &api_key,
    )));
    registry.register_ai(Arc::new(ChatCompletionsAi::new(
        "openai",
        &providers.openai_base_url,
        &api_key,
        &providers.ai_model,
    )));
    registry.register_tts(Arc::new(SpeechApiTts::new(
        &providers.openai_base_url,
        &api_key,
    )));

    if let (Some(binary), Some(model)) =
        (&providers.whisper_cpp_binary, &providers.whisper_cpp_model)
    {
        registry.register_stt(Arc::new(WhisperCppStt::new(model, binary)));
    }
    if let (Some(binary), Some(model)) = (&providers.piper_binary, &providers.piper_model) {
        registry.register_tts(Arc::new(PiperTts::new(binary, model)));
    }

    if let Some(name) = &providers.stt_default {
        registry.set_default(ProviderRole::Stt, name)?;
    }
    if let Some(name) = &providers.ai_default {
        registry.set_default(ProviderRole::Ai, name)?;
    }
    if let Some(name) = &providers.tts_default {
        registry.set_default(ProviderRole::Tts, name)?;
    }

    Ok(registry)
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(api_ws::ws_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_from_default_config_has_all_three_roles() {
        let registry =
            build_registry(&config::ProvidersConfig::default()).expect("registry builds");
        let catalog = registry.catalog();
        assert_eq!(catalog.stt, vec!["whisper".to_string()]);
        assert_eq!(catalog.ai, vec!["openai".to_string()]);
        assert_eq!(catalog.tts, vec!["speech-api".to_string()]);
    }

    #[test]
    fn local_providers_register_when_fully_configured() {
        let providers = config::ProvidersConfig {
            whisper_cpp_binary: Some("/usr/bin/whisper".to_string()),
            whisper_cpp_model: Some("/models/ggml-base.bin".to_string()),
            piper_binary: Some("/usr/bin/piper".to_string()),
            piper_model: Some("/models/voice.onnx".to_string()),
            tts_default: Some("piper".to_string()),
            ..config::ProvidersConfig::default()
        };
        let registry = build_registry(&providers).expect("registry builds");
        let catalog = registry.catalog();
        assert!(catalog.stt.contains(&"whisper-cpp".to_string()));
        assert!(catalog.tts.contains(&"piper".to_string()));
        assert_eq!(catalog.defaults.get("tts"), Some(&"piper".to_string()));
    }

    #[test]
    fn unknown_default_name_is_rejected() {
        let providers = config::ProvidersConfig {
            stt_default: Some("nonexistent".to_string()),
            ..config::ProvidersConfig::default()
        };
        assert!(build_registry(&providers).is_err());
    }
}
