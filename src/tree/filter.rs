//! File filtering for tree walking

use std::path::Path;

use glob::Pattern;

use crate::file_utils::normalize_extension;

use super::config::WalkerConfig;

/// Directory that is always pruned regardless of configuration.
const VCS_DIR: &str = ".git";

/// Decides which directories are pruned and which files are accepted.
///
/// Cheap to clone; the walker moves a copy into its pruning callback.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    exclude_names: Vec<String>,
    exclude_patterns: Vec<Pattern>,
    /// Suffixes including the leading dot, lowercased
    suffixes: Option<Vec<String>>,
}

impl FileFilter {
    pub fn new(config: &WalkerConfig) -> Self {
        let exclude_patterns = config
            .exclude_dirs
            .iter()
            .filter(|p| p.contains(['*', '?', '[']))
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        let suffixes = config.extensions.as_ref().map(|exts| {
            exts.iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .map(|e| format!(".{}", e))
                .collect()
        });

        Self {
            exclude_names: config.exclude_dirs.clone(),
            exclude_patterns,
            suffixes,
        }
    }

    /// Check if a directory with this name must not be descended into.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        name == VCS_DIR
            || self.exclude_names.iter().any(|n| n == name)
            || self.exclude_patterns.iter().any(|p| p.matches(name))
    }

    /// Check if a file passes the extension filter.
    pub fn accepts_file(&self, path: &Path) -> bool {
        let Some(suffixes) = &self.suffixes else {
            return true;
        };
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_ascii_lowercase();
        suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}
