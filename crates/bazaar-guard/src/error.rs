//! Guard error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type GuardResult<T> = Result<T, GuardError>;
