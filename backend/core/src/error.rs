use thiserror::Error;

/// Errors raised at the collaborator boundary, carried through `anyhow`
/// so callers can downcast when the variant matters. Booking failures
/// have their own typed error beside the ledger.
#[derive(Debug, Error)]
pub enum FrontDeskError {
    #[error("chat provider error ({provider}): {message}")]
    Llm { provider: String, message: String },

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}
