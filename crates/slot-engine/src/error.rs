//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Missing business config: {0}")]
    MissingBusinessConfig(String),

    #[error("Malformed time string: {0}")]
    MalformedTimeString(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Repository error: {0}")]
    Repository(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
