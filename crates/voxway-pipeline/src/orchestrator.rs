//! The pipeline orchestrator.

use crate::error::GatewayError;
use crate::prompts;
use crate::stage::PipelineStage;
use base64::Engine;
use std::sync::Arc;
use uuid::Uuid;
use voxway_providers::{AiTurn, ProviderRegistry};
use voxway_quota::UsageLedger;
use voxway_safety::SafetyGate;
use voxway_types::{
    AudioFormat, PipelineResult, ProviderOverrides, ProvidersUsed, RunOutcome, SafetyLevel,
    VoiceRequest,
};

/// A voice request as it arrives from the transport: audio still in its
/// transfer encoding, format still a label.
///
/// Decoding and validation happen *after* the quota reservation so that
/// malformed input still counts as an attempt; only the access key itself
/// is inspected before anything is consumed.
#[derive(Debug, Clone)]
pub struct RawVoiceRequest {
    pub access_key: String,
    pub audio_base64: String,
    pub audio_format: String,
    pub chat_id: Option<String>,
    pub safety_level: SafetyLevel,
    pub base_prompt: Option<String>,
    pub overrides: ProviderOverrides,
}

/// Drives one request through the five pipeline stages.
///
/// Holds shared handles to the registry, gate, and ledger; per-request
/// state lives on the stack of [`Orchestrator::process`]. The orchestrator
/// holds provider references only for the duration of one run.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    gate: Arc<SafetyGate>,
    ledger: UsageLedger,
}

impl Orchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, gate: Arc<SafetyGate>, ledger: UsageLedger) -> Self {
        Self {
            registry,
            gate,
            ledger,
        }
    }

    /// The ledger this orchestrator charges against.
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// The provider registry this orchestrator resolves from.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Runs one complete pipeline attempt.
    ///
    /// Reserves a quota unit first — auth and quota failures are the only
    /// outcomes that consume nothing. Every later failure (bad audio,
    /// unknown provider, stage error) keeps the reservation, and the
    /// terminal outcome is committed to the ledger for analytics.
    pub async fn process(&self, raw: RawVoiceRequest) -> Result<PipelineResult, GatewayError> {
        let reservation = self.ledger.reserve(&raw.access_key).await?;

        tracing::info!(
            key_id = %reservation.key_id,
            calls_today = reservation.calls_today,
            daily_limit = reservation.daily_limit,
            stage = PipelineStage::Received.as_str(),
            "pipeline run reserved"
        );

        let outcome = self.run(&raw).await;

        let (run_outcome, providers) = match &outcome {
            Ok(result) if result.blocked => (RunOutcome::Blocked, Some(result.providers.clone())),
            Ok(result) => (RunOutcome::Completed, Some(result.providers.clone())),
            Err(_) => (RunOutcome::Failed, None),
        };
        if let Err(e) = self
            .ledger
            .commit(&reservation, run_outcome, providers)
            .await
        {
            // A lost analytics row must not fail a finished run.
            tracing::warn!(key_id = %reservation.key_id, "failed to record run outcome: {e}");
        }

        outcome
    }

    /// The post-reservation state machine.
    async fn run(&self, raw: &RawVoiceRequest) -> Result<PipelineResult, GatewayError> {
        let request = self.decode(raw)?;

        // Resolve every role up front: an unknown override must surface
        // before the first provider call, and the result reports all three
        // identities regardless of where the run terminates.
        let stt = self.registry.resolve_stt(request.overrides.stt.as_deref())?;
        let ai = self.registry.resolve_ai(request.overrides.ai.as_deref())?;
        let tts = self.registry.resolve_tts(request.overrides.tts.as_deref())?;
        let providers = ProvidersUsed {
            stt: stt.name().to_string(),
            ai: ai.name().to_string(),
            tts: tts.name().to_string(),
        };

        // Mint a continuity token when the caller sent none, so the next
        // turn can correlate. Nothing is stored gateway-side either way.
        let chat_id = request
            .chat_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        tracing::debug!(
            stage = PipelineStage::Transcribing.as_str(),
            provider = %providers.stt,
            bytes = request.audio.len(),
            "invoking stt"
        );
        let transcript = stt
            .transcribe(&request.audio, request.format)
            .await
            .map_err(|source| GatewayError::Stt {
                provider: providers.stt.clone(),
                source,
            })?;

        tracing::debug!(
            stage = PipelineStage::InputSafetyCheck.as_str(),
            level = request.safety_level.as_str(),
            "checking transcript"
        );
        let verdict = self.gate.check(&transcript, request.safety_level);
        if !verdict.allowed {
            tracing::info!(
                stage = PipelineStage::Blocked.as_str(),
                category = %verdict.reason,
                "input blocked, no further provider calls"
            );
            return Ok(blocked_result(Some(transcript), verdict.reason, providers, chat_id));
        }

        let system_prompt = request
            .base_prompt
            .as_deref()
            .unwrap_or(prompts::default_prompt().prompt);

        tracing::debug!(
            stage = PipelineStage::Generating.as_str(),
            provider = %providers.ai,
            "invoking ai"
        );
        let reply = ai
            .generate(&AiTurn {
                user_text: &transcript,
                system_prompt,
                chat_id: &chat_id,
            })
            .await
            .map_err(|source| GatewayError::Ai {
                provider: providers.ai.clone(),
                source,
            })?;

        tracing::debug!(
            stage = PipelineStage::OutputSafetyCheck.as_str(),
            level = request.safety_level.as_str(),
            "checking reply"
        );
        let verdict = self.gate.check(&reply, request.safety_level);
        if !verdict.allowed {
            // The blocked reply is withheld entirely: it is neither
            // synthesized nor echoed back as text.
            tracing::info!(
                stage = PipelineStage::Blocked.as_str(),
                category = %verdict.reason,
                "output blocked, no synthesis"
            );
            return Ok(blocked_result(Some(transcript), verdict.reason, providers, chat_id));
        }

        tracing::debug!(
            stage = PipelineStage::Synthesizing.as_str(),
            provider = %providers.tts,
            chars = reply.len(),
            "invoking tts"
        );
        let audio = tts
            .synthesize(&reply)
            .await
            .map_err(|source| GatewayError::Tts {
                provider: providers.tts.clone(),
                source,
            })?;

        tracing::info!(stage = PipelineStage::Complete.as_str(), "pipeline run complete");

        Ok(PipelineResult {
            success: true,
            transcript: Some(transcript),
            reply: Some(reply),
            audio: Some(audio),
            blocked: false,
            safety_reason: None,
            providers,
            chat_id,
        })
    }

    /// Decodes and validates the raw request into a [`VoiceRequest`].
    ///
    /// Runs after the reservation: a failure here is a charged attempt.
    fn decode(&self, raw: &RawVoiceRequest) -> Result<VoiceRequest, GatewayError> {
        let format = AudioFormat::parse(&raw.audio_format)
            .ok_or_else(|| GatewayError::UnsupportedFormat(raw.audio_format.clone()))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(raw.audio_base64.as_bytes())
            .map_err(|e| GatewayError::AudioDecode(e.to_string()))?;

        let limit = self.ledger.policy().max_audio_bytes;
        if audio.len() > limit {
            return Err(GatewayError::SizeExceeded {
                size: audio.len(),
                limit,
            });
        }

        Ok(VoiceRequest {
            access_key: raw.access_key.clone(),
            audio,
            format,
            chat_id: raw.chat_id.clone(),
            safety_level: raw.safety_level,
            base_prompt: raw.base_prompt.clone(),
            overrides: raw.overrides.clone(),
        })
    }
}

fn blocked_result(
    transcript: Option<String>,
    reason: String,
    providers: ProvidersUsed,
    chat_id: String,
) -> PipelineResult {
    PipelineResult {
        success: false,
        transcript,
        reply: None,
        audio: None,
        blocked: true,
        safety_reason: Some(reason),
        providers,
        chat_id,
    }
}
