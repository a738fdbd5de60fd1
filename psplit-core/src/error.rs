use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output unwritable: {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("inconsistent resume state: {0}")]
    InconsistentState(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplitError {
    pub(crate) fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::OutputUnwritable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn source_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, SplitError>;
