use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Font size {0} is out of range (10-100)")]
    FontSizeOutOfRange(u32),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unknown background image: {0}")]
    UnknownBackground(String),

    #[error("Session {0} not found")]
    SessionNotFound(u64),
}
