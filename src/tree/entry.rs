//! Files discovered during traversal

use std::ffi::OsStr;
use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

/// A file accepted by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    path: PathBuf,
    relative: PathBuf,
}

impl FileEntry {
    pub fn new(path: PathBuf, relative: PathBuf) -> Self {
        Self { path, relative }
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative path with `/` separators, as written in marker lines.
    ///
    /// Each component goes through [`escape_name`], so distinct files never
    /// share a marker and a name can't spill onto a second line.
    pub fn display_path(&self) -> String {
        self.relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(escape_name(part)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Render a file name as a single printable line.
///
/// Backslashes are doubled, control characters use Rust escape syntax and
/// bytes that are not valid UTF-8 become `\xNN`. Printable text, including
/// non-ASCII letters, is kept as is.
pub fn escape_name(name: &OsStr) -> String {
    let mut out = String::new();
    for chunk in name.as_encoded_bytes().utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\\' {
                out.push_str("\\\\");
            } else if c.is_control() {
                out.extend(c.escape_default());
            } else {
                out.push(c);
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{:02x}", byte);
        }
    }
    out
}
