//! Reading source files as text
//!
//! Every file that passes the walker's filters is read whole and decoded as
//! UTF-8. Anything that can't be decoded is reported as a [`ReadFailure`] so
//! the caller can decide between annotating it and aborting.

use std::path::Path;

use crate::error::ReadFailure;

/// Read a file as UTF-8 text, refusing files above `max_size` bytes.
///
/// The size check uses the file's metadata so oversized files are never
/// loaded into memory.
pub fn read_text_file(path: &Path, max_size: Option<u64>) -> Result<String, ReadFailure> {
    if let Some(limit) = max_size {
        let size = path.metadata()?.len();
        if size > limit {
            return Err(ReadFailure::TooLarge { size, limit });
        }
    }

    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| ReadFailure::InvalidUtf8)
}

/// Normalize an extension for comparison: strip leading dots and lowercase.
///
/// Accepts both `"ts"` and `".TS"` style input.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
