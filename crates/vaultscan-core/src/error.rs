//! Error types for vault scanning and renaming.
//!
//! All errors in the system are represented by the [`Error`] enum.
//! Per-entity failures during a scan (unreadable files, broken symlinks)
//! are recovered and logged, so they never surface here.

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// The core error type for all vaultscan operations.
#[derive(ThisError, Debug)]
pub enum Error {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Vault root is missing, unreadable or not a directory
    #[error("Invalid vault {path}: {reason}")]
    InvalidVault { path: PathBuf, reason: String },

    /// Note identifier is empty or otherwise unusable
    #[error("Invalid note name: {reason}")]
    InvalidName { reason: String },

    /// No note matches the identifier
    #[error("Note not found: {name}")]
    NoteNotFound { name: String },

    /// More than one note matches a bare identifier
    #[error(
        "Ambiguous note name {name:?} matches multiple files: {} (use full path to disambiguate)",
        .candidates.join(", ")
    )]
    AmbiguousNote {
        name: String,
        candidates: Vec<String>,
    },

    /// Rename destination is already taken
    #[error("Destination file already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// A path (direct or through a symlink) resolves outside the vault
    #[error("Path escapes vault boundary: {path}")]
    BoundaryEscape { path: PathBuf },

    /// A rename write failed after some files were already rewritten
    #[error("Failed to write {path} ({modified} files already modified): {source}")]
    PartialWrite {
        path: PathBuf,
        modified: usize,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic unclassified error
    #[error("Error: {0}")]
    Other(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error
    pub fn io(err: io::Error) -> Self {
        Error::Io(err)
    }

    /// Create an invalid vault error
    pub fn invalid_vault(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidVault {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_name(reason: impl Into<String>) -> Self {
        Error::InvalidName {
            reason: reason.into(),
        }
    }

    /// Create a note not found error
    pub fn note_not_found(name: impl Into<String>) -> Self {
        Error::NoteNotFound { name: name.into() }
    }

    /// Create an ambiguous note error
    pub fn ambiguous_note(name: impl Into<String>, candidates: Vec<String>) -> Self {
        Error::AmbiguousNote {
            name: name.into(),
            candidates,
        }
    }

    /// Create a destination exists error
    pub fn destination_exists(path: impl Into<PathBuf>) -> Self {
        Error::DestinationExists { path: path.into() }
    }

    /// Create a boundary escape error
    pub fn boundary_escape(path: impl Into<PathBuf>) -> Self {
        Error::BoundaryEscape { path: path.into() }
    }

    /// Create a partial write error
    pub fn partial_write(path: impl Into<PathBuf>, modified: usize, source: io::Error) -> Self {
        Error::PartialWrite {
            path: path.into(),
            modified,
            source,
        }
    }

    /// Create a configuration error
    pub fn config_error(reason: impl Into<String>) -> Self {
        Error::ConfigError {
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// True for errors raised before any filesystem mutation took place.
    pub fn is_pre_operation(&self) -> bool {
        !matches!(self, Error::PartialWrite { .. } | Error::Io(_) | Error::Other(_))
    }

    /// Number of files already rewritten when a rename aborted mid-way.
    pub fn files_modified(&self) -> Option<usize> {
        match self {
            Error::PartialWrite { modified, .. } => Some(*modified),
            _ => None,
        }
    }
}
