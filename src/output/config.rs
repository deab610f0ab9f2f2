//! Output configuration types

use clap::ValueEnum;

const DEFAULT_MARKER: &str = "// Path: ";
const DEFAULT_RULE_CHAR: char = '=';
const DEFAULT_RULE_WIDTH: usize = 50;

/// Layout of one file block in the combined output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BlockStyle {
    /// Marker line, blank line, content, blank line, horizontal rule
    #[default]
    Banner,
    /// `--- path ---` line, content, blank line
    Dashed,
}

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub style: BlockStyle,
    /// Text placed before the relative path on banner marker lines
    pub marker: String,
    pub rule_char: char,
    pub rule_width: usize,
}

impl OutputConfig {
    /// The separator line closing a banner block, without its newline.
    pub fn rule(&self) -> String {
        self.rule_char.to_string().repeat(self.rule_width)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: BlockStyle::default(),
            marker: DEFAULT_MARKER.to_string(),
            rule_char: DEFAULT_RULE_CHAR,
            rule_width: DEFAULT_RULE_WIDTH,
        }
    }
}
