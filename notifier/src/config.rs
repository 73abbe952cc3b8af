use clap::Parser;
use std::ffi::OsString;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TITLE: &str = "Claude Code";
pub const DEFAULT_MESSAGE: &str = "Claude Code needs your attention";
pub const DEFAULT_SOUND: &str = "Glass";

/// Time the OS gets to take ownership of a posted notification before the
/// process that submitted it disappears.
pub const DEFAULT_POST_EXIT_DELAY_MS: u64 = 500;
/// Time the OS gets to finish a focus change before the process exits.
pub const DEFAULT_ACTIVATE_EXIT_DELAY_MS: u64 = 300;

/// Overrides for the two termination delays, in milliseconds.
pub const POST_EXIT_DELAY_ENV_VAR: &str = "CLAUDE_NOTIFIER_POST_EXIT_DELAY_MS";
pub const ACTIVATE_EXIT_DELAY_ENV_VAR: &str = "CLAUDE_NOTIFIER_ACTIVATE_EXIT_DELAY_MS";

/// Command-line arguments. Every positional is optional and falls back to its
/// own default; values are passed through untouched (empty strings included).
/// There are no flags: `-h`, `--version` and `--` are ordinary text.
#[derive(Debug, Clone, Parser)]
#[command(name = "claude-notifier", disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    /// Notification title.
    #[arg(default_value = DEFAULT_TITLE, allow_hyphen_values = true)]
    pub title: String,

    /// Notification body text.
    #[arg(default_value = DEFAULT_MESSAGE, allow_hyphen_values = true)]
    pub message: String,

    /// Name of the system sound played with the notification.
    #[arg(default_value = DEFAULT_SOUND, allow_hyphen_values = true)]
    pub sound: String,

    /// Anything past the third positional is ignored.
    #[arg(hide = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}

impl Args {
    /// Parses `argv` (program name first) with every later word taken as a
    /// positional.
    pub fn from_argv<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().unwrap_or_else(|| OsString::from("claude-notifier"));
        // A leading `--` ends option parsing for clap, so any later `--` or
        // dash-prefixed word is taken as a value.
        let words = [program, OsString::from("--")].into_iter().chain(argv);
        Self::try_parse_from(words)
    }
}

/// Self-termination delays for the two kinds of exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitDelays {
    pub after_post: Duration,
    pub after_activate: Duration,
}

impl ExitDelays {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads each override through `lookup`. Unset or unparsable values keep
    /// the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: u64| {
            let Some(raw) = lookup(key) else {
                return Duration::from_millis(default);
            };
            match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(e) => {
                    warn!(target: "config", "Ignoring {key}={raw:?}: {e}");
                    Duration::from_millis(default)
                }
            }
        };
        Self {
            after_post: read(POST_EXIT_DELAY_ENV_VAR, DEFAULT_POST_EXIT_DELAY_MS),
            after_activate: read(ACTIVATE_EXIT_DELAY_ENV_VAR, DEFAULT_ACTIVATE_EXIT_DELAY_MS),
        }
    }
}

impl Default for ExitDelays {
    fn default() -> Self {
        Self {
            after_post: Duration::from_millis(DEFAULT_POST_EXIT_DELAY_MS),
            after_activate: Duration::from_millis(DEFAULT_ACTIVATE_EXIT_DELAY_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let argv = std::iter::once("claude-notifier").chain(args.iter().copied());
        Args::from_argv(argv).unwrap()
    }

    // ── positional defaults ───────────────────────────────────────────────────

    #[test]
    fn no_arguments_uses_all_defaults() {
        let args = parse(&[]);
        assert_eq!(args.title, DEFAULT_TITLE);
        assert_eq!(args.message, DEFAULT_MESSAGE);
        assert_eq!(args.sound, DEFAULT_SOUND);
    }

    #[test]
    fn title_only_keeps_message_and_sound_defaults() {
        let args = parse(&["Build done"]);
        assert_eq!(args.title, "Build done");
        assert_eq!(args.message, DEFAULT_MESSAGE);
        assert_eq!(args.sound, DEFAULT_SOUND);
    }

    #[test]
    fn title_and_message_keep_sound_default() {
        let args = parse(&["Build done", "All tests passed"]);
        assert_eq!(args.title, "Build done");
        assert_eq!(args.message, "All tests passed");
        assert_eq!(args.sound, DEFAULT_SOUND);
    }

    #[test]
    fn all_three_positionals() {
        let args = parse(&["Build done", "All tests passed", "Ping"]);
        assert_eq!(args.title, "Build done");
        assert_eq!(args.message, "All tests passed");
        assert_eq!(args.sound, "Ping");
    }

    #[test]
    fn empty_strings_are_passed_through() {
        let args = parse(&["", ""]);
        assert_eq!(args.title, "");
        assert_eq!(args.message, "");
        assert_eq!(args.sound, DEFAULT_SOUND);
    }

    #[test]
    fn hyphenated_message_is_not_treated_as_a_flag() {
        let args = parse(&["Tests", "-3 failures"]);
        assert_eq!(args.message, "-3 failures");
    }

    #[test]
    fn help_and_version_words_are_plain_text() {
        let args = parse(&["-h"]);
        assert_eq!(args.title, "-h");
        assert_eq!(args.message, DEFAULT_MESSAGE);

        let args = parse(&["Tests", "--version"]);
        assert_eq!(args.message, "--version");

        let args = parse(&["Build", "-V", "--help"]);
        assert_eq!((args.message.as_str(), args.sound.as_str()), ("-V", "--help"));
    }

    #[test]
    fn double_dash_is_kept_as_a_positional() {
        let args = parse(&["--", "x"]);
        assert_eq!(args.title, "--");
        assert_eq!(args.message, "x");

        let args = parse(&["Deploy", "--", "--"]);
        assert_eq!(args.message, "--");
        assert_eq!(args.sound, "--");
    }

    #[test]
    fn option_like_words_are_plain_text() {
        let args = parse(&["Deploy", "--post-exit-delay-ms"]);
        assert_eq!(args.message, "--post-exit-delay-ms");
        assert_eq!(args.sound, DEFAULT_SOUND);
    }

    #[test]
    fn extra_positionals_are_ignored() {
        let args = parse(&["a", "b", "c", "d", "e"]);
        assert_eq!(args.sound, "c");
        assert_eq!(args.extra, vec!["d".to_string(), "e".to_string()]);
    }

    // ── exit delays ───────────────────────────────────────────────────────────

    #[test]
    fn default_exit_delays() {
        let delays = ExitDelays::default();
        assert_eq!(delays.after_post, Duration::from_millis(500));
        assert_eq!(delays.after_activate, Duration::from_millis(300));
        assert!(delays.after_activate < delays.after_post);
    }

    #[test]
    fn exit_delays_follow_env_overrides() {
        let delays = ExitDelays::from_lookup(|key| match key {
            POST_EXIT_DELAY_ENV_VAR => Some("1200".to_string()),
            ACTIVATE_EXIT_DELAY_ENV_VAR => Some(" 50 ".to_string()),
            _ => None,
        });
        assert_eq!(delays.after_post, Duration::from_millis(1200));
        assert_eq!(delays.after_activate, Duration::from_millis(50));
    }

    #[test]
    fn unset_or_invalid_env_keeps_default_delays() {
        assert_eq!(ExitDelays::from_lookup(|_| None), ExitDelays::default());
        let delays = ExitDelays::from_lookup(|key| {
            (key == POST_EXIT_DELAY_ENV_VAR).then(|| "soon".to_string())
        });
        assert_eq!(delays, ExitDelays::default());
    }
}
