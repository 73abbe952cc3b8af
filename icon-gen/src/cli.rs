use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::paths;

/// Composes the notifier's application icon onto a rounded-rectangle canvas.
///
/// Paths are taken as raw OS strings so an empty slot can stand for "default".
#[derive(Debug, Parser)]
#[command(name = "claude-icon-gen", version)]
pub struct Args {
    /// Output PNG path [default: ./clawd-1024.png]
    pub output: Option<OsString>,

    /// Source image [default: ~/.claude/hooks/claude-code-notifier/assets/clawd-normal.png]
    pub source: Option<OsString>,
}

impl Args {
    /// Output path; an empty slot means the default.
    pub fn output_path(&self) -> PathBuf {
        non_empty(self.output.as_ref()).unwrap_or_else(paths::default_output_path)
    }

    /// Source path; an empty slot means the default.
    pub fn source_path(&self) -> PathBuf {
        non_empty(self.source.as_ref()).unwrap_or_else(paths::default_source_path)
    }
}

fn non_empty(raw: Option<&OsString>) -> Option<PathBuf> {
    raw.filter(|p| !p.is_empty()).map(PathBuf::from)
}
