//! Error types for `cm-core`.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;
use crate::types::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no open check-out found for {subject}")]
    NoOpenRecord { subject: String },

    #[error("no saved log named {name:?}")]
    SnapshotNotFound { name: String },

    #[error("not a .csv file: {}", path.display())]
    InvalidFileType { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Broad failure categories used for user-facing reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required selection or name was missing.
    Validation,
    /// No open record to check in, or no snapshot under the name.
    NotFound,
    /// Stored data or text could not be decoded.
    Parse,
    /// A file or storage backend failed.
    Io,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NoOpenRecord { .. } | Self::SnapshotNotFound { .. } => ErrorKind::NotFound,
            Self::Serialization(_) => ErrorKind::Parse,
            Self::InvalidFileType { .. }
            | Self::Read { .. }
            | Self::Write { .. }
            | Self::Store(_)
            | Self::Csv(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
