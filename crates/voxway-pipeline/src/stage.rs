//! Pipeline state machine states.

/// The states of one pipeline run, in execution order, plus the two
/// terminal failure states reachable from any stage.
///
/// Modeled explicitly (rather than as nested branching) so every terminal
/// state and its side effects — ledger consumed vs. not, provider calls
/// made vs. not — is independently testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Request accepted, quota reserved, audio not yet validated.
    Received,
    /// STT capability invoked.
    Transcribing,
    /// Safety gate running on the transcript.
    InputSafetyCheck,
    /// AI capability invoked.
    Generating,
    /// Safety gate running on the AI reply.
    OutputSafetyCheck,
    /// TTS capability invoked.
    Synthesizing,
    /// All stages done; result assembled.
    Complete,
    /// A safety checkpoint stopped the run. Terminal, not a fault.
    Blocked,
    /// A stage failed. Terminal.
    Failed,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Transcribing => "transcribing",
            Self::InputSafetyCheck => "input_safety_check",
            Self::Generating => "generating",
            Self::OutputSafetyCheck => "output_safety_check",
            Self::Synthesizing => "synthesizing",
            Self::Complete => "complete",
            Self::Blocked => "blocked",
            Self::Failed => "failed",
        }
    }
}
