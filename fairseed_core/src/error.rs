#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FairError {
    /// Rejected before any seed material is consumed.
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type FairResult<T> = Result<T, FairError>;

pub(crate) fn config_err(msg: impl Into<String>) -> FairError {
    FairError::Config(msg.into())
}

pub(crate) fn state_err(msg: impl Into<String>) -> FairError {
    FairError::InvalidState(msg.into())
}
