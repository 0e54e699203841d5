//! Notification records surfaced to UI collaborators.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    /// A platform overtook the previous leader
    NewLeader,

    /// A platform climbed in the ranking
    PlatformRise,

    /// A platform dropped in the ranking. Classified but never recorded;
    /// kept so the wire enum matches the feed format the UI understands.
    PlatformFall,

    /// A platform's score jumped past the surge threshold
    PerformanceSurge,

    /// General informational message
    Info,
}

/// A single alert in the notification feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique, monotonically increasing id
    pub id: u64,

    /// Human-readable alert text
    pub message: String,

    /// Display-formatted local time of creation
    pub timestamp: String,

    pub kind: NotificationKind,
}

impl Notification {
    /// Create a notification stamped with the current local time.
    pub fn new(id: u64, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            kind,
        }
    }
}
