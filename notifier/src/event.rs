#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The user clicked the notification while this process was still alive.
    NotificationActivated,
    /// A self-termination timer fired. Only the most recently scheduled
    /// generation is allowed to end the process.
    Terminate { generation: u64 },
}
