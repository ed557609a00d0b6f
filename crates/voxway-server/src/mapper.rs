//! Translation between the JSON-RPC tool-call shape and the pipeline's
//! internal request/result types. Thin adapter, no business logic.

use crate::rpc::{self, RpcError};
use serde::Deserialize;
use serde_json::{json, Value};
use voxway_pipeline::{GatewayError, RawVoiceRequest};
use voxway_types::{PipelineResult, ProviderOverrides, SafetyLevel, UsageRecord};

fn default_audio_format() -> String {
    "wav".to_string()
}

/// Wire shape of `process_voice` params.
#[derive(Debug, Deserialize)]
pub struct ProcessVoiceParams {
    pub access_key: String,
    /// Base64-encoded audio payload.
    pub audio_file: String,
    #[serde(default = "default_audio_format")]
    pub audio_format: String,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub safety_level: Option<SafetyLevel>,
    #[serde(default)]
    pub base_prompt: Option<String>,
    #[serde(default)]
    pub stt_provider: Option<String>,
    #[serde(default)]
    pub ai_provider: Option<String>,
    #[serde(default)]
    pub tts_provider: Option<String>,
}

/// Wire shape of `check_voice_usage` params.
#[derive(Debug, Deserialize)]
pub struct CheckUsageParams {
    pub access_key: String,
}

/// Builds the pipeline input from wire params. Audio stays encoded here;
/// the orchestrator decodes after the quota reservation.
pub fn to_raw_request(params: ProcessVoiceParams) -> RawVoiceRequest {
    RawVoiceRequest {
        access_key: params.access_key,
        audio_base64: params.audio_file,
        audio_format: params.audio_format,
        chat_id: params.chat_id,
        safety_level: params.safety_level.unwrap_or_default(),
        base_prompt: params.base_prompt,
        overrides: ProviderOverrides {
            stt: params.stt_provider,
            ai: params.ai_provider,
            tts: params.tts_provider,
        },
    }
}

/// Serializes a pipeline result into the wire response shape.
pub fn to_reply(result: &PipelineResult) -> Value {
    use base64::Engine;
    json!({
        "success": result.success,
        "transcribed_text": result.transcript,
        "ai_response": result.reply,
        "output_audio_base64": result
            .audio
            .as_ref()
            .map(|a| base64::engine::general_purpose::STANDARD.encode(a)),
        "blocked": result.blocked,
        "safety_reason": result.safety_reason,
        "providers": {
            "stt": result.providers.stt,
            "ai": result.providers.ai,
            "tts": result.providers.tts,
        },
        "chat_id": result.chat_id,
    })
}

/// Serializes a usage record projection for `check_voice_usage`.
pub fn usage_to_reply(record: &UsageRecord) -> Value {
    json!({
        "access_key_id": record.access_key_id,
        "tier": record.tier.as_str(),
        "daily_limit": record.daily_limit,
        "calls_today": record.calls_today,
        "remaining": record.remaining(),
        "window_start": record.window_start.to_string(),
    })
}

/// Maps a gateway error onto a JSON-RPC error object.
///
/// Safety blocks never arrive here — they are normal results. Unknown
/// provider overrides are the caller naming something that does not
/// exist, hence invalid params rather than a provider failure.
pub fn error_to_rpc(err: &GatewayError) -> RpcError {
    match err {
        GatewayError::Auth(source) => RpcError::new(rpc::AUTH_ERROR, source.to_string()),
        GatewayError::QuotaExceeded { resets_at } => {
            RpcError::new(rpc::QUOTA_EXCEEDED, err.to_string())
                .with_data(json!({ "resets_at": resets_at.to_rfc3339() }))
        }
        GatewayError::AudioDecode(_)
        | GatewayError::UnsupportedFormat(_)
        | GatewayError::SizeExceeded { .. } => {
            RpcError::new(rpc::AUDIO_REJECTED, err.to_string())
        }
        GatewayError::UnknownProvider(source) => {
            RpcError::new(rpc::INVALID_PARAMS, source.to_string())
        }
        GatewayError::Stt { provider, .. }
        | GatewayError::Ai { provider, .. }
        | GatewayError::Tts { provider, .. } => {
            RpcError::new(rpc::PROVIDER_FAILURE, err.to_string())
                .with_data(json!({ "provider": provider }))
        }
        GatewayError::Ledger(_) => RpcError::new(rpc::INTERNAL_ERROR, err.to_string()),
    }
}
