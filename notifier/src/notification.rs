/// Notification posting and the bridge that carries interaction events from
/// the OS notification subsystem back into the controller's event loop.
///
/// The controller builds exactly one [`ObserverHandle`] at startup and hands
/// it to [`NotificationCenter::deliver`]; there is no process-wide observer.
use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Args;
use crate::event::ControllerEvent;

#[cfg(not(target_os = "macos"))]
const APP_NAME: &str = "claude-notifier";
/// Action identifier freedesktop servers report for a click on the body.
#[cfg(not(target_os = "macos"))]
const DEFAULT_ACTION: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub sound_name: String,
}

impl NotificationRequest {
    pub fn from_args(args: &Args) -> Self {
        Self {
            title: args.title.clone(),
            message: args.message.clone(),
            sound_name: args.sound.clone(),
        }
    }
}

/// Callbacks the notification subsystem makes into the controller.
pub trait InteractionObserver {
    /// The user clicked the notification.
    fn did_activate(&self);
    /// Whether to show the notification even if the sender is frontmost.
    fn should_present(&self, request: &NotificationRequest) -> bool;
}

/// The controller's single observer. Cheap to clone so a backend can move a
/// copy onto whatever thread the OS delivers callbacks on.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    tx: mpsc::Sender<ControllerEvent>,
}

impl ObserverHandle {
    pub fn new(tx: mpsc::Sender<ControllerEvent>) -> Self {
        Self { tx }
    }
}

impl InteractionObserver for ObserverHandle {
    fn did_activate(&self) {
        // Non-blocking so it is safe from both the loop and foreign threads.
        // A closed channel means the process is already on its way out.
        if self.tx.try_send(ControllerEvent::NotificationActivated).is_err() {
            debug!(target: "observer", "activation dropped; controller is shutting down");
        }
    }

    fn should_present(&self, _request: &NotificationRequest) -> bool {
        // The sender is a short-lived CLI helper, never the user's focus.
        true
    }
}

/// The OS notification subsystem as seen by the controller.
pub trait NotificationCenter {
    /// Enqueues `request` for display and registers `observer` for its
    /// interaction callbacks. Display itself is asynchronous.
    fn deliver(&mut self, request: &NotificationRequest, observer: &ObserverHandle) -> Result<()>;
}

/// Desktop notifications: mac-notification-sys on macOS, notify-rust
/// elsewhere.
#[derive(Debug, Default)]
pub struct DesktopNotificationCenter;

impl NotificationCenter for DesktopNotificationCenter {
    fn deliver(&mut self, request: &NotificationRequest, observer: &ObserverHandle) -> Result<()> {
        if !observer.should_present(request) {
            debug!(target: "notification", "observer declined presentation");
            return Ok(());
        }
        imp::deliver(request, observer)?;
        debug!(target: "notification", title = %request.title, "notification posted");
        Ok(())
    }
}

/// Runs `wait` on a detached thread and reports a click to `observer`.
///
/// `wait` blocks until the OS says how the notification ended and returns
/// `true` for a click. Process exit never waits on the thread.
#[cfg_attr(not(unix), allow(dead_code))]
fn watch_for_click<F>(observer: &ObserverHandle, wait: F) -> Result<()>
where
    F: FnOnce() -> bool + Send + 'static,
{
    let observer = observer.clone();
    std::thread::Builder::new()
        .name("notification-observer".into())
        .spawn(move || {
            if wait() {
                observer.did_activate();
            }
        })
        .map(|_| ())
        .context("Failed to spawn notification observer thread")
}

// ── Platform delivery ─────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
mod imp {
    use super::*;
    use mac_notification_sys::{Notification, NotificationResponse};
    use tracing::warn;

    /// Posting with `wait_for_click` blocks until the banner is dismissed, so
    /// the whole submission happens on the observer thread.
    pub fn deliver(request: &NotificationRequest, observer: &ObserverHandle) -> Result<()> {
        let request = request.clone();
        watch_for_click(observer, move || {
            let response = Notification::new()
                .title(&request.title)
                .message(&request.message)
                .sound(request.sound_name.as_str())
                .wait_for_click(true)
                .send();
            match response {
                Ok(NotificationResponse::Click) => true,
                Ok(_) => false,
                Err(e) => {
                    warn!(target: "notification", "Failed to post notification: {e}");
                    false
                }
            }
        })
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
mod imp {
    use super::*;

    pub fn deliver(request: &NotificationRequest, observer: &ObserverHandle) -> Result<()> {
        let handle = notification(request)
            .show()
            .context("Failed to post notification")?;
        watch_for_click(observer, move || {
            let mut clicked = false;
            handle.wait_for_action(|action| clicked = action == DEFAULT_ACTION);
            clicked
        })
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    /// No in-process interaction events here; a click relaunches us.
    pub fn deliver(request: &NotificationRequest, _observer: &ObserverHandle) -> Result<()> {
        notification(request)
            .show()
            .map(|_| ())
            .context("Failed to post notification")
    }
}

#[cfg(not(target_os = "macos"))]
fn notification(request: &NotificationRequest) -> notify_rust::Notification {
    let mut notification = notify_rust::Notification::new();
    notification
        .appname(APP_NAME)
        .summary(&request.title)
        .body(&request.message)
        .sound_name(&request.sound_name)
        .action(DEFAULT_ACTION, "Show terminal");
    notification
}
