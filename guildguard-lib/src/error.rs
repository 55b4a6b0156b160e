use thiserror::Error;

use crate::security::Category;

/// Errors that can occur in the guard
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid policy for category {category}: {reason}")]
    InvalidPolicy { category: Category, reason: String },

    #[error("Unknown rate limit category: {0}")]
    UnknownCategory(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Malformed event: {0}")]
    Event(String),
}

pub type Result<T> = std::result::Result<T, GuardError>;
