//! Error types for concatenation runs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a single source file could not be turned into text.
///
/// The `Display` text doubles as the inline annotation written in place of
/// the file's content.
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("not valid UTF-8 text")]
    InvalidUtf8,

    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// Fatal errors that abort a whole run.
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("cannot access '{}': No such file or directory", path.display())]
    RootNotFound { path: PathBuf },

    #[error("cannot access '{}': {source}", path.display())]
    RootAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot write '{}': {source}", path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: ReadFailure,
    },

    #[error("traversal failed: {0}")]
    Walk(#[from] ignore::Error),
}

impl ConcatError {
    pub(crate) fn destination(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Destination {
            path: path.into(),
            source,
        }
    }
}
