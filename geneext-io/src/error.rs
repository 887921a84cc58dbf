use std::io;
use thiserror::Error;

use geneext_core::GeneextError;

/// Error type for geneext-io operations.
#[derive(Error, Debug)]
pub enum GxfIoError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file could not be opened (missing, unreadable, bad gzip header...).
    #[error("Failed to open {path}: {reason}")]
    Open { path: String, reason: String },

    /// The requested format or format combination can't be handled.
    #[error(transparent)]
    Geneext(#[from] GeneextError),
}

/// Result type alias for geneext-io operations.
pub type Result<T> = std::result::Result<T, GxfIoError>;
