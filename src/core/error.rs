use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, CacheError::InvalidState(_))
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
