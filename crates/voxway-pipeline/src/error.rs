//! The gateway error taxonomy.
//!
//! Each variant is a terminal outcome of one run. The grouping mirrors
//! what the transport needs to know: whether quota was consumed, which
//! stage failed, and which provider was involved. Safety blocks are *not*
//! errors — they are normal results with `blocked = true`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use voxway_providers::{ProviderError, RegistryError};
use voxway_quota::AccessError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad or unknown access key. No quota was consumed.
    #[error("access denied: {0}")]
    Auth(#[source] AccessError),

    /// The key's daily window is exhausted. No provider calls were made.
    #[error("quota exceeded, resets at {resets_at}")]
    QuotaExceeded { resets_at: DateTime<Utc> },

    /// The audio payload could not be decoded from its transfer encoding.
    /// The reservation was already consumed.
    #[error("audio decode failed: {0}")]
    AudioDecode(String),

    /// The declared audio format is outside the supported set.
    /// The reservation was already consumed.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The decoded audio exceeds the payload limit.
    /// The reservation was already consumed.
    #[error("audio payload is {size} bytes, limit is {limit}")]
    SizeExceeded { size: usize, limit: usize },

    /// A provider override named an unregistered provider.
    #[error(transparent)]
    UnknownProvider(#[from] RegistryError),

    /// The STT capability failed (provider error or timeout).
    #[error("stt provider '{provider}' failed: {source}")]
    Stt {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// The AI capability failed.
    #[error("ai provider '{provider}' failed: {source}")]
    Ai {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// The TTS capability failed.
    #[error("tts provider '{provider}' failed: {source}")]
    Tts {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// The usage store itself failed mid-operation.
    #[error("usage ledger error: {0}")]
    Ledger(#[source] AccessError),
}

impl From<AccessError> for GatewayError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::MalformedKey | AccessError::UnknownKey | AccessError::KeyDisabled => {
                Self::Auth(e)
            }
            AccessError::QuotaExceeded { resets_at } => Self::QuotaExceeded { resets_at },
            other => Self::Ledger(other),
        }
    }
}
