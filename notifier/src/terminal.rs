use anyhow::Result;
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, info, warn};

/// A terminal emulator eligible for focus activation.
#[derive(Debug, PartialEq, Eq)]
pub struct TerminalCandidate {
    pub name: &'static str,
    /// macOS bundle identifier.
    pub bundle_id: &'static str,
    /// Executable names as reported by the process table.
    pub process_names: &'static [&'static str],
    /// X11 WM_CLASS used by `wmctrl -x`.
    pub wm_class: &'static str,
}

/// Terminals in activation priority order. When several are running, the
/// first one listed wins regardless of recency or window count.
pub const TERMINAL_CANDIDATES: &[TerminalCandidate] = &[
    TerminalCandidate {
        name: "iTerm2",
        bundle_id: "com.googlecode.iterm2",
        process_names: &["iTerm2"],
        wm_class: "iterm2",
    },
    TerminalCandidate {
        name: "Terminal",
        bundle_id: "com.apple.Terminal",
        process_names: &["Terminal"],
        wm_class: "terminal",
    },
    TerminalCandidate {
        name: "WezTerm",
        bundle_id: "com.github.wez.wezterm",
        process_names: &["wezterm-gui", "WezTerm"],
        wm_class: "org.wezfurlong.wezterm",
    },
    TerminalCandidate {
        name: "Alacritty",
        bundle_id: "io.alacritty",
        process_names: &["alacritty"],
        wm_class: "Alacritty",
    },
    TerminalCandidate {
        name: "kitty",
        bundle_id: "net.kovidgoyal.kitty",
        process_names: &["kitty"],
        wm_class: "kitty",
    },
];

/// One entry of the OS's running-application list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningApplication {
    pub pid: u32,
    pub name: String,
    pub bundle_id: Option<String>,
}

impl TerminalCandidate {
    /// Matches by bundle id when the registry reports one, otherwise by
    /// case-insensitive executable name.
    pub fn matches(&self, app: &RunningApplication) -> bool {
        match &app.bundle_id {
            Some(id) => id == self.bundle_id,
            None => self
                .process_names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(&app.name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationOptions {
    pub ignoring_other_apps: bool,
}

/// Read-only view of the OS's running applications, plus the one action the
/// controller needs from it.
pub trait ApplicationRegistry {
    /// Point-in-time snapshot of running applications.
    fn running_applications(&mut self) -> Vec<RunningApplication>;

    fn activate(
        &mut self,
        candidate: &TerminalCandidate,
        app: &RunningApplication,
        options: ActivationOptions,
    ) -> Result<()>;
}

/// Scans `candidates` in order and returns the first one with a running match.
pub fn find_terminal<'a, 'b>(
    candidates: &'a [TerminalCandidate],
    running: &'b [RunningApplication],
) -> Option<(&'a TerminalCandidate, &'b RunningApplication)> {
    candidates.iter().find_map(|candidate| {
        running
            .iter()
            .find(|app| candidate.matches(app))
            .map(|app| (candidate, app))
    })
}

/// Brings the highest-priority running terminal to the foreground.
///
/// Returns the candidate that was targeted, or `None` when no known terminal
/// is running (it may have been closed since the agent started). Neither a
/// missing terminal nor a failed activation is treated as an error.
pub fn activate_terminal<R: ApplicationRegistry>(
    registry: &mut R,
) -> Option<&'static TerminalCandidate> {
    let running = registry.running_applications();
    let Some((candidate, app)) = find_terminal(TERMINAL_CANDIDATES, &running) else {
        debug!(target: "terminal", "no known terminal running; nothing to activate");
        return None;
    };

    let options = ActivationOptions { ignoring_other_apps: true };
    match registry.activate(candidate, app, options) {
        Ok(()) => info!(target: "terminal", "Activated {} (pid {})", candidate.name, app.pid),
        Err(e) => warn!(target: "terminal", "Failed to activate {}: {e:#}", candidate.name),
    }
    Some(candidate)
}

/// Registry backed by the live process table.
#[derive(Default)]
pub struct SystemRegistry {
    sys: System,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl ApplicationRegistry for SystemRegistry {
    fn running_applications(&mut self) -> Vec<RunningApplication> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        self.sys
            .processes()
            .values()
            .map(|p| RunningApplication {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().into_owned(),
                bundle_id: None,
            })
            .collect()
    }

    fn activate(
        &mut self,
        candidate: &TerminalCandidate,
        _app: &RunningApplication,
        options: ActivationOptions,
    ) -> Result<()> {
        debug!(
            target: "terminal",
            bundle_id = candidate.bundle_id,
            ignoring_other_apps = options.ignoring_other_apps,
            "activating"
        );
        imp::activate(candidate, options)
    }
}

// ── Platform activation ───────────────────────────────────────────────────────

/// Starts `program` without waiting for it. The child's exit status is
/// collected by a task on the current runtime and only logged, so a slow
/// helper never holds up the loop or the termination timer.
#[cfg(unix)]
fn spawn_detached(program: &'static str, args: &[&str]) -> Result<()> {
    use anyhow::Context;
    use std::process::Stdio;
    use tokio::process::Command;

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to run {program}"))?;

    tokio::spawn(async move {
        match child.wait_with_output().await {
            Ok(output) if output.status.success() => {
                debug!(target: "terminal", "{program} finished");
            }
            Ok(output) => warn!(
                target: "terminal",
                "{program} exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => warn!(target: "terminal", "Failed to wait for {program}: {e}"),
        }
    });
    Ok(())
}

#[cfg(target_os = "macos")]
mod imp {
    use super::*;

    /// AppleScript `activate` always brings the app frontmost ahead of every
    /// other app, so `ignoring_other_apps` is implied.
    pub fn activate(candidate: &TerminalCandidate, _options: ActivationOptions) -> Result<()> {
        let script = format!(r#"tell application id "{}" to activate"#, candidate.bundle_id);
        spawn_detached("osascript", &["-e", &script])
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
mod imp {
    use super::*;

    /// `wmctrl -a` switches desktops and raises the window, so the
    /// `ignoring_other_apps` flag has no finer-grained equivalent here.
    pub fn activate(candidate: &TerminalCandidate, _options: ActivationOptions) -> Result<()> {
        spawn_detached("wmctrl", &["-x", "-a", candidate.wm_class])
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    pub fn activate(candidate: &TerminalCandidate, _options: ActivationOptions) -> Result<()> {
        anyhow::bail!("Activating {} is not supported on this platform", candidate.name)
    }
}
