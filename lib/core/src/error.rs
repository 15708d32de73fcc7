use std::path::Path;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn corrupt(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Error::CorruptArtifact {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Startup artifact failures: a missing file or one that does not parse.
    pub fn is_artifact_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::CorruptArtifact { .. })
    }
}
