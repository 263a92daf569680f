use thiserror::Error;

use crate::types::ResultId;

/// Broad failure classes surfaced to callers and to the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Conflict,
    State,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate result id: {0}")]
    DuplicateId(ResultId),

    #[error("Unknown result: {0}")]
    UnknownResult(ResultId),

    #[error("Action already pending for result {0}")]
    AlreadyPending(ResultId),

    #[error("Invalid state: {0}")]
    State(String),
}

impl Error {
    /// `UnknownResult` is a caller contract violation, so it lands in `State`
    /// alongside the other integration bugs.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig(_) | Error::InvalidInput(_) | Error::DuplicateId(_) | Error::AlreadyPending(_) => ErrorKind::Validation,
            Error::UnknownResult(_) | Error::State(_) => ErrorKind::State,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the search and conversion collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected request: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::Network(_) => ErrorKind::Network,
            ProviderError::Validation(_) => ErrorKind::Validation,
            ProviderError::Conflict(_) => ErrorKind::Conflict,
        }
    }

    /// The human-readable part, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Network(m) | ProviderError::Validation(m) | ProviderError::Conflict(m) => m,
        }
    }
}
