/// Notification lifecycle controller.
///
/// ```text
/// Start --(trigger record)--> ActivateTerminal --(after_activate)--> exit
/// Start --(no trigger)------> PostNotification --(after_post)------> exit
/// PostNotification --(click)--> ActivateTerminal --(after_activate)--> exit
/// ```
///
/// All work runs synchronously on the loop that drives [`Controller::run`];
/// the only suspension points are the termination timers. Every path ends
/// with exactly one honoured `Terminate` event.
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{Args, ExitDelays};
use crate::event::ControllerEvent;
use crate::launch::LaunchContext;
use crate::notification::{NotificationCenter, NotificationRequest, ObserverHandle};
use crate::terminal::{self, ApplicationRegistry};
use crate::timer::TerminationTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Start,
    PostNotification,
    ActivateTerminal,
}

/// Which of the three paths through the state machine a run took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPath {
    ActivatedFromRelaunch,
    Posted,
    PostedThenActivated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: ExitPath,
    /// Terminal that was targeted for activation, if any.
    pub activated: Option<&'static str>,
    pub notification_submitted: bool,
    /// Timers armed over the run. Later timers replace earlier ones, so only
    /// the last of them ever fires.
    pub timers_scheduled: u64,
}

pub struct Controller<N, R> {
    notifications: N,
    registry: R,
    delays: ExitDelays,
    timer: TerminationTimer,
    observer: ObserverHandle,
    state: ControllerState,
    relaunched: bool,
    notification_submitted: bool,
    activated: Option<&'static str>,
}

impl<N: NotificationCenter, R: ApplicationRegistry> Controller<N, R> {
    /// `tx` must feed the receiver later passed to [`Controller::run`].
    pub fn new(
        notifications: N,
        registry: R,
        delays: ExitDelays,
        tx: mpsc::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            notifications,
            registry,
            delays,
            timer: TerminationTimer::new(tx.clone()),
            observer: ObserverHandle::new(tx),
            state: ControllerState::Start,
            relaunched: false,
            notification_submitted: false,
            activated: None,
        }
    }

    /// Runs the whole lifecycle: handles the launch, then processes events
    /// until the current termination timer fires.
    pub async fn run(
        mut self,
        launch: LaunchContext,
        args: &Args,
        mut events: mpsc::Receiver<ControllerEvent>,
    ) -> RunSummary {
        self.did_finish_launching(launch, args);

        while let Some(event) = events.recv().await {
            if self.handle_event(event) {
                break;
            }
        }

        self.summary()
    }

    /// Startup routing. Called exactly once.
    pub fn did_finish_launching(&mut self, launch: LaunchContext, args: &Args) {
        match launch {
            LaunchContext::RelaunchFromNotificationClick(record) => {
                info!(target: "controller", "Relaunched by notification '{}'", record.identifier);
                self.relaunched = true;
                self.enter_activate_terminal();
            }
            LaunchContext::FreshLaunch => {
                self.post_notification(NotificationRequest::from_args(args));
            }
        }
    }

    /// Returns `true` when the process should exit.
    pub fn handle_event(&mut self, event: ControllerEvent) -> bool {
        match event {
            ControllerEvent::NotificationActivated => {
                match self.state {
                    ControllerState::PostNotification => {
                        info!(target: "controller", "Notification clicked");
                        self.enter_activate_terminal();
                    }
                    ControllerState::ActivateTerminal => {
                        debug!(target: "controller", "already activating; click ignored");
                    }
                    ControllerState::Start => {
                        debug!(target: "controller", "click before launch handling; ignored");
                    }
                }
                false
            }
            ControllerEvent::Terminate { generation } => {
                if self.timer.is_current(generation) {
                    true
                } else {
                    debug!(target: "controller", generation, "stale termination timer ignored");
                    false
                }
            }
        }
    }

    fn post_notification(&mut self, request: NotificationRequest) {
        self.state = ControllerState::PostNotification;
        if let Err(e) = self.notifications.deliver(&request, &self.observer) {
            warn!(target: "notification", "{e:#}");
        }
        self.notification_submitted = true;
        self.timer.schedule(self.delays.after_post);
    }

    fn enter_activate_terminal(&mut self) {
        self.state = ControllerState::ActivateTerminal;
        self.activated = terminal::activate_terminal(&mut self.registry).map(|c| c.name);
        self.timer.schedule(self.delays.after_activate);
    }

    fn summary(&self) -> RunSummary {
        let path = match (self.relaunched, self.state) {
            (true, _) => ExitPath::ActivatedFromRelaunch,
            (false, ControllerState::ActivateTerminal) => ExitPath::PostedThenActivated,
            (false, _) => ExitPath::Posted,
        };
        RunSummary {
            path,
            activated: self.activated,
            notification_submitted: self.notification_submitted,
            timers_scheduled: self.timer.generation(),
        }
    }
}
