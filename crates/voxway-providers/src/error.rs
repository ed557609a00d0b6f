use thiserror::Error;

/// Errors produced by provider calls.
///
/// The pipeline maps these onto its own per-stage failure variants along
/// with the provider identity; this enum only describes *how* the call
/// failed, not *which stage* it belonged to.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider is missing required configuration (API key, binary path).
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The request could not be sent or the transport failed mid-flight.
    #[error("request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The provider answered, but the payload was not in the expected shape.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    /// A local provider subprocess failed to start or exited non-zero.
    #[error("provider process failed: {0}")]
    Process(String),

    /// The bounded per-call wait elapsed.
    #[error("provider call timed out after {0} seconds")]
    Timeout(u64),
}
