//! Application error types.

use std::path::PathBuf;

use tablekit_core::key::PrimaryKey;
use tablekit_core::movies::MovieError;
use tablekit_core::storage::StoreError;
use thiserror::Error;

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors that end a command.
///
/// An unmet write condition never shows up here; it is reported and the
/// command still succeeds.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to load movie {key}: {source}")]
    Load {
        key: PrimaryKey,
        #[source]
        source: StoreError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Movie(#[from] MovieError),

    #[error("Table '{table_name}' not found")]
    TableNotFound { table_name: String },

    #[error("Timeout waiting for table '{table_name}' to become active")]
    TableActivationTimeout { table_name: String },

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled by user")]
    UserCancelled,
}
