use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("Call not found: {0}")]
    CallNotFound(Uuid),

    #[error("Call {0} is already human controlled")]
    CallAlreadyHumanControlled(Uuid),

    #[error("A takeover is already in progress for call {0}")]
    TakeoverInProgress(Uuid),

    #[error("Transition announcement failed: {0}")]
    AnnouncementFailed(String),

    #[error("No takeover in progress for call {0}")]
    NotTransitioning(Uuid),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type HandoffResult<T> = Result<T, HandoffError>;
