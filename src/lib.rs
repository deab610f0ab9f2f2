//! treecat - concatenate a directory tree into one annotated text file

pub mod concat;
pub mod error;
pub mod file_utils;
pub mod output;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use concat::{ConcatConfig, ConcatSummary, Concatenator, ReadPolicy, concatenate};
pub use error::{ConcatError, ReadFailure};
pub use file_utils::read_text_file;
pub use output::{BlockStyle, BlockWriter, OutputConfig};
pub use tree::{DEFAULT_EXCLUDED_DIRS, FileEntry, FileFilter, TreeWalker, WalkerConfig};
