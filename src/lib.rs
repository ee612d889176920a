pub mod config;
pub mod error;
pub mod exif;
pub mod merge;
pub mod metadata;
pub mod processor;
pub mod vision;
pub mod walker;

pub use error::{AppError, Result};
pub use processor::{Pipeline, RunSummary};
