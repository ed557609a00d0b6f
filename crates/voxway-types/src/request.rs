//! Pipeline request and result types.
//!
//! A [`VoiceRequest`] is the decoded, validated input to one pipeline run;
//! a [`PipelineResult`] is its terminal output. Both are transport-agnostic:
//! the server crate maps JSON-RPC params into and out of these.

use crate::{AudioFormat, SafetyLevel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-role provider overrides carried on a request.
///
/// `None` means "use the registry default for that role".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOverrides {
    pub stt: Option<String>,
    pub ai: Option<String>,
    pub tts: Option<String>,
}

/// A decoded voice-processing request.
///
/// The audio bytes have already been decoded from the transfer encoding;
/// size and format validation against [`crate::MAX_AUDIO_BYTES`] happens
/// inside the pipeline so that malformed input still consumes a quota unit.
#[derive(Clone)]
pub struct VoiceRequest {
    /// Caller credential gating quota and tier.
    pub access_key: String,
    /// Decoded audio payload.
    pub audio: Vec<u8>,
    /// Declared container format of `audio`.
    pub format: AudioFormat,
    /// Continuity token forwarded to the AI provider; no state is stored.
    pub chat_id: Option<String>,
    /// Requested content-safety strictness.
    pub safety_level: SafetyLevel,
    /// Override for the AI system prompt; `None` selects the catalog default.
    pub base_prompt: Option<String>,
    /// Per-role provider overrides.
    pub overrides: ProviderOverrides,
}

impl fmt::Debug for VoiceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceRequest")
            .field("access_key", &"[REDACTED]")
            .field("audio_bytes", &self.audio.len())
            .field("format", &self.format)
            .field("chat_id", &self.chat_id)
            .field("safety_level", &self.safety_level)
            .field("has_base_prompt", &self.base_prompt.is_some())
            .field("overrides", &self.overrides)
            .finish()
    }
}

/// Provider identities used for one pipeline run, reported for transparency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersUsed {
    pub stt: String,
    pub ai: String,
    pub tts: String,
}

/// Terminal output of one pipeline run.
///
/// When `blocked` is true, `audio` is always `None` and `reply` never
/// carries the blocked content — only `safety_reason` explains the block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// True only when all five stages completed.
    pub success: bool,
    /// STT transcript, present once transcription succeeded.
    pub transcript: Option<String>,
    /// AI reply text; absent for blocked outcomes.
    pub reply: Option<String>,
    /// Synthesized reply audio; absent for blocked outcomes.
    pub audio: Option<Vec<u8>>,
    /// True when a safety checkpoint stopped the run.
    pub blocked: bool,
    /// Why the safety gate blocked, when it did.
    pub safety_reason: Option<String>,
    /// Providers resolved for this run.
    pub providers: ProvidersUsed,
    /// Continuity token echoed (or minted) for the next turn.
    pub chat_id: String,
}

/// Verdict produced by the safety gate for one piece of text.
///
/// Ephemeral: produced and consumed within a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyVerdict {
    pub allowed: bool,
    pub reason: String,
    pub level: SafetyLevel,
}

impl SafetyVerdict {
    /// An allowing verdict at the given level.
    pub fn allow(level: SafetyLevel) -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            level,
        }
    }

    /// A blocking verdict with the category that matched.
    pub fn block(level: SafetyLevel, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            level,
        }
    }
}
