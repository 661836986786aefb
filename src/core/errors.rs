//! Shared error types for the analysis core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Source text could not be structurally analyzed. Recovered per file;
    /// the coordinator downgrades this to a diagnostic.
    #[error("parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// Caller contract violation. Fatal to the analyze call.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Error {
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
