use crate::registry::Phase;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, VotingError>;

#[derive(Error, Debug)]
pub enum VotingError {
    #[error("Window length {0}s outside allowed bounds")]
    InvalidWindow(u64),

    #[error("Poll not found: {0}")]
    NotFound(u64),

    #[error("Operation not valid in {0} phase")]
    WrongPhase(Phase),

    #[error("Commitment already submitted by voter {0}")]
    AlreadyCommitted(Uuid),

    #[error("No commitment found for voter {0}")]
    NoCommitment(Uuid),

    #[error("Revealed vote does not match commitment of voter {0}")]
    CommitmentMismatch(Uuid),

    #[error("Reveal phase not finished for poll {0}")]
    RevealNotFinished(u64),

    #[error("Caller does not hold the required authority")]
    Unauthorized,
}
