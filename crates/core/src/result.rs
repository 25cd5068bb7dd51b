// crates/core/src/result.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AariError {
    #[error("NLU error: {0}")]
    Nlu(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type AariResult<T> = Result<T, AariError>;
