//! Shared types and constants for the Voxway gateway.
//!
//! This crate provides the foundational types used across all Voxway crates:
//! audio formats, safety levels, quota tiers, provider roles, the pipeline
//! request/result types, and the gateway policy structure.
//!
//! No crate in the workspace depends on anything *except* `voxway-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};

mod policy;
mod request;
mod usage;

pub use policy::GatewayPolicy;
pub use request::{
    PipelineResult, ProviderOverrides, ProvidersUsed, SafetyVerdict, VoiceRequest,
};
pub use usage::{RunOutcome, UsageRecord};

/// Maximum decoded audio payload size (10 MiB). Requests above this are
/// rejected before any provider call.
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Audio container formats accepted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    Wav,
    Ogg,
    Mp3,
}

impl AudioFormat {
    /// Returns the canonical lowercase label for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
        }
    }

    /// Parses a format label (case-insensitive).
    ///
    /// Returns `None` for formats outside the supported set.
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "ogg" => Some(Self::Ogg),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }

    /// Returns the MIME type used when forwarding audio to providers.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
        }
    }
}

/// Content-safety strictness selected per request.
///
/// `Strict` blocks broad categories of adult/violent/explicit content and
/// anything ambiguous; `Moderate` blocks explicit or harmful content only;
/// `Permissive` blocks only clearly harmful content. Sexual content
/// involving minors is blocked at every level without exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyLevel {
    #[default]
    Strict,
    Moderate,
    Permissive,
}

impl SafetyLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Permissive => "permissive",
        }
    }

    /// Parses a level label (case-insensitive).
    pub fn parse(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "moderate" => Some(Self::Moderate),
            "permissive" => Some(Self::Permissive),
            _ => None,
        }
    }
}

/// Quota class bound to an access key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Professional,
    Enterprise,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
        }
    }

    /// Parses a tier label as stored in the database.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "free" => Some(Self::Free),
            "professional" => Some(Self::Professional),
            "enterprise" => Some(Self::Enterprise),
            _ => None,
        }
    }
}

/// Logical provider roles in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    Stt,
    Ai,
    Tts,
}

impl ProviderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Ai => "ai",
            Self::Tts => "tts",
        }
    }
}

impl std::fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
