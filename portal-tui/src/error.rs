//! Console error type

use portal_grid::{GridError, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("grid error: {0}")]
    Grid(#[from] GridError),

    #[error("backend error: {0}")]
    Source(#[from] SourceError),

    #[error("logger error: {0}")]
    Logger(#[from] log::SetLoggerError),
}
