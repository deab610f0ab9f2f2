//! Directory tree walking logic
//!
//! `TreeWalker` turns a root directory into a sorted stream of `FileEntry`
//! values, pruning excluded directories before descending into them and
//! dropping files rejected by the extension filter.

mod config;
mod entry;
mod filter;
mod walker;

pub use config::{DEFAULT_EXCLUDED_DIRS, WalkerConfig};
pub use entry::FileEntry;
pub use filter::FileFilter;
pub use walker::{FileEntries, TreeWalker};
