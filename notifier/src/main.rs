mod config;
mod controller;
mod event;
mod launch;
mod notification;
mod terminal;
mod timer;

use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::controller::Controller;
use crate::notification::DesktopNotificationCenter;
use crate::terminal::SystemRegistry;

const LOG_ENV_VAR: &str = "CLAUDE_NOTIFIER_LOG";

// Single-threaded: every controller step runs on this one loop.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // ── Logging ───────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ── Arguments + launch metadata ───────────────────────────────────────────
    let args = config::Args::from_argv(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let launch = launch::classify(&launch::LaunchMetadata::from_env());
    debug!(target: "controller", ?launch, "classified launch");

    // ── Controller ────────────────────────────────────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<event::ControllerEvent>(8);
    let controller = Controller::new(
        DesktopNotificationCenter,
        SystemRegistry::new(),
        config::ExitDelays::from_env(),
        event_tx,
    );

    let summary = controller.run(launch, &args, event_rx).await;
    info!(
        target: "controller",
        path = ?summary.path,
        activated = summary.activated.unwrap_or("none"),
        submitted = summary.notification_submitted,
        timers = summary.timers_scheduled,
        "exiting"
    );
}
