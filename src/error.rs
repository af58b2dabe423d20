// src/error.rs
use thiserror::Error;

use crate::edit::ValidationErrors;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Stored secret could not be decoded: {0}")]
    Decode(String),
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("Encryption failed: {0}")]
    Seal(String),
    #[error("Passphrase does not match the configured verifier")]
    WrongPassphrase,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote store answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Credential {0} not found")]
    NotFound(u64),
    #[error("Repository failure: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Form is invalid: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Secret could not be processed: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Saving failed: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Input failed: {0}")]
    Input(String),
}

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Workflow(#[from] WorkflowError),
    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CLI error: {0}")]
    Cli(String),
}

pub type AppResult<T> = Result<T, AppError>;
pub type EncodingResult<T> = Result<T, EncodingError>;
pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type WorkflowResult<T> = Result<T, WorkflowError>;
