//! Error taxonomy shared by the engine and the CLI layer.
//!
//! Validation failures are not errors: they are recorded in
//! `ValidationOutcome::passed`. Every variant here is fatal for the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    /// Invalid or contradictory configuration, detected before any lockfile is read.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read lockfile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lockfile {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A defect inside a validator, as opposed to a failed policy check.
    #[error("validator {validator} failed internally: {message}")]
    InternalValidator { validator: String, message: String },
}

impl LintError {
    pub(crate) fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        LintError::Parse {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn internal(validator: &str, message: impl Into<String>) -> Self {
        LintError::InternalValidator {
            validator: validator.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;
