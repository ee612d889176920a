use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Tokio join error: {0}")]
    Join(#[from] JoinError),

    /// The external EXIF tool could not be invoked at all. Fatal for the run.
    #[error("Required tool is not available: {0}")]
    ToolMissing(String),

    #[error("EXIF error: {0}")]
    Exif(String),

    #[error("Vision error: {0}")]
    Vision(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
