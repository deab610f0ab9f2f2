//! Configuration types for the tree walker

use std::path::PathBuf;

/// Directory names pruned by default: the package manager's dependency cache.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules"];

/// Configuration for tree walking behavior.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Directory names (or glob patterns) that are never descended into
    pub exclude_dirs: Vec<String>,
    /// Accepted file suffixes; `None` accepts every file
    pub extensions: Option<Vec<String>>,
    /// Honor `.gitignore` / `.ignore` files found in the tree
    pub respect_ignore_files: bool,
    /// Absolute paths that are never emitted, e.g. the output file itself
    pub skip_paths: Vec<PathBuf>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            extensions: None,
            respect_ignore_files: false,
            skip_paths: Vec::new(),
        }
    }
}
