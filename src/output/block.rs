//! Block writer - streams one marker/content/separator block per file

use std::io::{self, Write};

use crate::error::ReadFailure;

use super::config::{BlockStyle, OutputConfig};

/// Writes file blocks to any `io::Write` destination as they arrive.
///
/// Nothing is buffered beyond what the underlying writer buffers, so memory
/// use does not grow with the number of files.
pub struct BlockWriter<W: Write> {
    config: OutputConfig,
    rule: String,
    out: W,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(out: W, config: OutputConfig) -> Self {
        let rule = config.rule();
        Self {
            config,
            rule,
            out,
        }
    }

    /// Write a block holding a file's full content.
    pub fn write_content(&mut self, path: &str, content: &str) -> io::Result<()> {
        self.write_block(path, content)
    }

    /// Write a block whose content is replaced by an error note.
    pub fn write_error(&mut self, path: &str, failure: &ReadFailure) -> io::Result<()> {
        self.write_block(path, &error_note(failure))
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_block(&mut self, path: &str, body: &str) -> io::Result<()> {
        match self.config.style {
            BlockStyle::Banner => {
                write!(self.out, "{}{}\n\n", self.config.marker, path)?;
                self.out.write_all(body.as_bytes())?;
                write!(self.out, "\n\n{}\n", self.rule)?;
            }
            BlockStyle::Dashed => {
                writeln!(self.out, "--- {} ---", path)?;
                self.out.write_all(body.as_bytes())?;
                self.out.write_all(b"\n\n")?;
            }
        }
        Ok(())
    }
}

/// Inline note written in place of content that could not be read.
pub fn error_note(failure: &ReadFailure) -> String {
    format!("(error reading file: {})", failure)
}
