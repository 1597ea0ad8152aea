//! Error type shared by every archive-dir operation.
//!
//! Each variant maps to a fixed process exit code so scripts can tell a
//! missing config apart from a refused precondition or a failed `7z` run.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Missing, blank or unparsable configuration value.
    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Source path is not absolute or does not live under the home directory.
    #[error("invalid path '{}': {reason}", path.display())]
    Path { path: PathBuf, reason: String },

    #[error("unsupported platform '{0}': only POSIX systems and Windows are supported")]
    UnsupportedPlatform(String),

    /// The filesystem is not in the state an operation requires.
    #[error("{message}: {}", path.display())]
    Precondition { path: PathBuf, message: String },

    /// An external program could not be started or exited unsuccessfully.
    #[error("{program} failed: {detail}")]
    BackendExecution { program: String, detail: String },

    /// The extracted archive does not match the original directory.
    #[error(
        "archive contents differ from '{}' (extracted copy left at '{}')",
        original.display(),
        extracted.display()
    )]
    VerificationMismatch { original: PathBuf, extracted: PathBuf },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    pub fn precondition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ArchiveError::Precondition {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn backend(program: impl Into<String>, detail: impl Into<String>) -> Self {
        ArchiveError::BackendExecution {
            program: program.into(),
            detail: detail.into(),
        }
    }

    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ArchiveError::Config { .. } => 1,
            ArchiveError::Path { .. } | ArchiveError::Precondition { .. } => 2,
            ArchiveError::UnsupportedPlatform(_) => 3,
            ArchiveError::BackendExecution { .. } | ArchiveError::Io { .. } => 4,
            ArchiveError::VerificationMismatch { .. } => 5,
        }
    }
}
