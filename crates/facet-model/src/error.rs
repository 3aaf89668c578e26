use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),
    #[error("unknown store kind: {0}")]
    UnknownStore(String),
    #[error("persistence key must not be empty")]
    EmptyKey,
    #[error("coordination group for {key} must not be empty")]
    EmptyGroup { key: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
