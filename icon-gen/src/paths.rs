/// Default file locations for the icon compositor.
///
/// The source artwork ships with the notifier hook under the user's Claude
/// configuration directory:
///   ~/.claude/hooks/claude-code-notifier/assets/clawd-normal.png
use std::path::PathBuf;

use crate::compose::CANVAS_SIZE;

const SOURCE_RELATIVE_PATH: &str = ".claude/hooks/claude-code-notifier/assets/clawd-normal.png";

/// Returns the default source image path under the home directory. Falls
/// back to the relative path when no home directory can be determined.
pub fn default_source_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(SOURCE_RELATIVE_PATH),
        None => PathBuf::from(SOURCE_RELATIVE_PATH),
    }
}

/// Returns the default output path: `./clawd-<size>.png`.
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!("./clawd-{CANVAS_SIZE}.png"))
}
