//! Combined output formatting
//!
//! - `config` - block style, marker text and separator rule
//! - `block` - the streaming block writer

mod block;
mod config;

pub use block::{BlockWriter, error_note};
pub use config::{BlockStyle, OutputConfig};
