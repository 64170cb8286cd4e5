//! Errors from writing run output.
//!
//! The engine itself cannot fail; only the recorders that persist its output
//! can, and they degrade rather than abort (see [`crate::output`]).

use std::path::PathBuf;
use thiserror::Error;

/// Failure writing a summary or frame file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        OutputError::Csv {
            path: path.into(),
            source,
        }
    }
}
