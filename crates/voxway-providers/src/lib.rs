//! Provider capabilities for the Voxway pipeline.
//!
//! Each pipeline role (STT, AI, TTS) is a small capability trait with a
//! fixed input/output contract; the [`ProviderRegistry`] maps role +
//! provider name to an implementation and resolves per-role defaults.
//! The orchestrator is provider-agnostic: provider identity is reported
//! in results for transparency but never affects control flow.
//!
//! Concrete providers come in two flavors: HTTP-backed (Whisper-style
//! transcription, OpenAI-compatible chat, speech-synthesis endpoints) and
//! local subprocess-backed (whisper.cpp, piper). All enforce a bounded
//! per-call timeout; a timeout surfaces as a provider error.

mod ai;
mod error;
mod registry;
mod stt;
mod tts;

use async_trait::async_trait;
use voxway_types::AudioFormat;

pub use ai::ChatCompletionsAi;
pub use error::ProviderError;
pub use registry::{ProviderCatalog, ProviderRegistry, RegistryError};
pub use stt::{WhisperApiStt, WhisperCppStt};
pub use tts::{PiperTts, SpeechApiTts};

/// One turn of input for the AI capability.
#[derive(Debug, Clone)]
pub struct AiTurn<'a> {
    /// The user's transcribed utterance.
    pub user_text: &'a str,
    /// System prompt shaping the reply.
    pub system_prompt: &'a str,
    /// Continuity token correlating turns of one conversation. Forwarded
    /// opaquely; the gateway stores no conversation state.
    pub chat_id: &'a str,
}

/// Speech-to-text capability.
#[async_trait]
pub trait SttProvider: Send + Sync {
    /// Provider name as reported in results (e.g. "whisper").
    fn name(&self) -> &str;

    /// Transcribes the audio payload to text.
    async fn transcribe(&self, audio: &[u8], format: AudioFormat)
        -> Result<String, ProviderError>;
}

/// Text-generation capability.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name as reported in results (e.g. "openai").
    fn name(&self) -> &str;

    /// Generates a reply for one conversation turn.
    async fn generate(&self, turn: &AiTurn<'_>) -> Result<String, ProviderError>;
}

/// Text-to-speech capability.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Provider name as reported in results (e.g. "piper").
    fn name(&self) -> &str;

    /// Synthesizes the text to audio bytes.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}
