//! Error types for sheet reading and writing

use harasim_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sheet operations
pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Error)]
pub enum SheetError {
    /// Sheet file does not exist
    #[error("Sheet was not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error reading or writing a sheet
    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// CSV syntax error
    #[error("Malformed sheet {}, line {line}: {message}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Template has fewer rows than its configured header
    #[error(
        "Scenario template {} has {rows} row(s), header_size is {header_size}",
        .path.display()
    )]
    ShortTemplate {
        path: PathBuf,
        rows: usize,
        header_size: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
