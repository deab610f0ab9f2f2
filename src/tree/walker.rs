//! TreeWalker - lazily yields the files to concatenate

use std::path::{Path, PathBuf};

use ignore::{DirEntry, Walk, WalkBuilder};

use super::config::WalkerConfig;
use super::entry::FileEntry;
use super::filter::FileFilter;

/// Recursive walker that prunes excluded directories and applies the
/// extension filter.
///
/// Siblings are visited in file-name order, so two walks over an unchanged
/// tree yield the same sequence. Symlinks are never followed and symlinked
/// files are not yielded.
pub struct TreeWalker {
    config: WalkerConfig,
    filter: FileFilter,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig) -> Self {
        let filter = FileFilter::new(&config);
        Self { config, filter }
    }

    /// Walk `root`, which is expected to be an absolute directory path.
    ///
    /// Errors for individual unreadable directories are yielded inline;
    /// the walk carries on past them.
    pub fn walk(&self, root: &Path) -> FileEntries {
        let respect = self.config.respect_ignore_files;
        let prune = self.filter.clone();

        let inner = WalkBuilder::new(root)
            .hidden(false)
            .parents(respect)
            .ignore(respect)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| !is_pruned(entry, &prune))
            .build();

        FileEntries {
            inner,
            root: root.to_path_buf(),
            filter: self.filter.clone(),
            skip_paths: self.config.skip_paths.clone(),
        }
    }
}

fn is_pruned(entry: &DirEntry, filter: &FileFilter) -> bool {
    entry.file_type().is_some_and(|ft| ft.is_dir())
        && filter.is_excluded_dir(&entry.file_name().to_string_lossy())
}

/// Iterator over accepted files, in traversal order.
pub struct FileEntries {
    inner: Walk,
    root: PathBuf,
    filter: FileFilter,
    skip_paths: Vec<PathBuf>,
}

impl Iterator for FileEntries {
    type Item = Result<FileEntry, ignore::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };

            // Directories and symlinks have no content of their own
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.filter.accepts_file(path) {
                continue;
            }
            if self.skip_paths.iter().any(|p| p == path) {
                continue;
            }

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };
            return Some(Ok(FileEntry::new(
                path.to_path_buf(),
                relative.to_path_buf(),
            )));
        }
    }
}
