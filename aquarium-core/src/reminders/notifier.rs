use crate::error::AquariumError;
use serde::{Deserialize, Serialize};

/// Permission state reported by the host notification facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    #[default]
    Default,
}

/// Delivers a reminder to the user.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    fn notify(&self, title: &str, body: &str) -> Result<(), AquariumError>;
}
