/// Launch classification: decides once, at startup, whether this process was
/// started from a shell or relaunched because the user clicked a notification.
///
/// The launcher that relaunches the helper on notification interaction passes
/// the triggering notification through [`TRIGGER_ENV_VAR`].
pub const TRIGGER_ENV_VAR: &str = "CLAUDE_NOTIFIER_TRIGGER";

/// The notification whose activation caused this launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub identifier: String,
}

/// What the environment tells us about why the process was started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchMetadata {
    pub triggering_notification: Option<NotificationRecord>,
}

impl LaunchMetadata {
    pub fn from_env() -> Self {
        Self::from_trigger(std::env::var(TRIGGER_ENV_VAR).ok().as_deref())
    }

    /// Builds metadata from the raw trigger value. Unset and blank values both
    /// mean "no triggering notification".
    pub fn from_trigger(raw: Option<&str>) -> Self {
        let triggering_notification = raw
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| NotificationRecord { identifier: id.to_string() });
        Self { triggering_notification }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchContext {
    FreshLaunch,
    RelaunchFromNotificationClick(NotificationRecord),
}

pub fn classify(metadata: &LaunchMetadata) -> LaunchContext {
    match &metadata.triggering_notification {
        Some(record) => LaunchContext::RelaunchFromNotificationClick(record.clone()),
        None => LaunchContext::FreshLaunch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_trigger_is_fresh_launch() {
        let metadata = LaunchMetadata::from_trigger(None);
        assert_eq!(classify(&metadata), LaunchContext::FreshLaunch);
    }

    #[test]
    fn blank_trigger_is_fresh_launch() {
        assert_eq!(classify(&LaunchMetadata::from_trigger(Some(""))), LaunchContext::FreshLaunch);
        assert_eq!(classify(&LaunchMetadata::from_trigger(Some("  \n"))), LaunchContext::FreshLaunch);
    }

    #[test]
    fn trigger_record_is_relaunch() {
        let metadata = LaunchMetadata::from_trigger(Some(" notif-42 "));
        assert_eq!(
            classify(&metadata),
            LaunchContext::RelaunchFromNotificationClick(NotificationRecord {
                identifier: "notif-42".to_string()
            })
        );
    }

    #[test]
    fn default_metadata_has_no_trigger() {
        assert_eq!(classify(&LaunchMetadata::default()), LaunchContext::FreshLaunch);
    }
}
