/// Self-termination timer.
///
/// Each timer is a fire-once task on the controller's own loop that sends
/// [`ControllerEvent::Terminate`] after its delay. Scheduling a new timer
/// aborts the pending one and bumps the generation, and the event loop only
/// honours a `Terminate` carrying the current generation. At most one timer is
/// therefore live at any instant, whichever branch scheduled it.
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use crate::event::ControllerEvent;

pub struct TerminationTimer {
    tx: mpsc::Sender<ControllerEvent>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl TerminationTimer {
    pub fn new(tx: mpsc::Sender<ControllerEvent>) -> Self {
        Self { tx, generation: 0, pending: None }
    }

    /// Arms the timer, replacing any timer that has not fired yet.
    pub fn schedule(&mut self, delay: Duration) {
        if let Some(prev) = self.pending.take() {
            prev.abort();
        }
        self.generation += 1;
        let generation = self.generation;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ControllerEvent::Terminate { generation }).await;
        }));
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Number of timers scheduled so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
