use thiserror::Error;

use crate::providers::traits::ModelError;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Session error: {0}")]
    Session(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
