//! Error types for the surge scanner

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed payload: {message}")]
    Payload { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScannerError>;
