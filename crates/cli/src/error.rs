//! CLI error type.

use ledgerboot_bootstrap::ValidationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad failure category, for callers that branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or contradictory flags, found before any mode runs.
    Configuration,
    /// A precondition of the selected mode does not hold; nothing was written.
    Precondition,
    /// The bootstrap collaborator reported a failure.
    Collaborator,
    /// A filesystem write failed.
    Io,
}

/// Errors that terminate the process.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid flags: {0}")]
    InvalidFlags(String),

    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{0:#}")]
    Collaborator(anyhow::Error),
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CliError::InvalidFlags(_) | CliError::InvalidInput(_) => ErrorKind::Configuration,
            CliError::FileExists(_) => ErrorKind::Precondition,
            CliError::Io { .. } => ErrorKind::Io,
            CliError::Collaborator(_) => ErrorKind::Collaborator,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        CliError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
