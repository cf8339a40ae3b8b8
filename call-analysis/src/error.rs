use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis transcript is empty")]
    EmptyTranscript,

    #[error("Call {0} is already finalized")]
    CallAlreadyFinalized(Uuid),

    #[error("Key moment at {timestamp_secs}s is past the call end ({duration_secs}s)")]
    MomentAfterCallEnd {
        timestamp_secs: u32,
        duration_secs: u32,
    },

    #[error("Call belongs to patient {found}, not {expected}")]
    PatientMismatch { expected: Uuid, found: Uuid },

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
