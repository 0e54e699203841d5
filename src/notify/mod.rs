//! Notification history and toast state.
//!
//! Owns the bounded alert feed consumed by the UI layer: a most-recent-first
//! history capped at five entries, plus a single transient toast that
//! self-expires unless a newer toast supersedes it first.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{Notification, NotificationKind};

/// Maximum entries kept in the notification history.
pub const HISTORY_CAP: usize = 5;

/// How long a toast stays active before self-expiring.
pub const TOAST_TTL: Duration = Duration::from_millis(5000);

#[derive(Default)]
struct SinkInner {
    /// Most-recent-first, never longer than [`HISTORY_CAP`]
    history: Vec<Notification>,
    toast: Option<Notification>,
    toast_timer: Option<JoinHandle<()>>,
    last_id: u64,
}

/// Shared handle to the notification state.
#[derive(Clone, Default)]
pub struct NotificationSink {
    inner: Arc<RwLock<SinkInner>>,
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification: prepend to the history (evicting the oldest
    /// entry past the cap) and make it the active toast.
    ///
    /// The previous toast's expiry timer is aborted, and the new timer only
    /// clears the toast it was armed for, so a stale timer can never wipe a
    /// newer toast.
    pub async fn record(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let mut inner = self.inner.write().await;

        let now = Utc::now().timestamp_millis() as u64;
        let id = now.max(inner.last_id + 1);
        inner.last_id = id;

        let notification = Notification::new(id, kind, message);
        debug!("Recording notification {}: {}", id, notification.message);

        inner.history.insert(0, notification.clone());
        inner.history.truncate(HISTORY_CAP);

        if let Some(timer) = inner.toast_timer.take() {
            timer.abort();
        }
        inner.toast = Some(notification.clone());

        let shared = self.inner.clone();
        inner.toast_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(TOAST_TTL).await;
            let mut inner = shared.write().await;
            // Guard by identity: only clear the toast this timer was armed for
            if inner.toast.as_ref().map(|t| t.id) == Some(id) {
                inner.toast = None;
                inner.toast_timer = None;
            }
        }));

        notification
    }

    /// Empty the history. An in-flight toast is left untouched.
    pub async fn clear(&self) {
        self.inner.write().await.history.clear();
    }

    /// The notification history, most recent first.
    pub async fn history(&self) -> Vec<Notification> {
        self.inner.read().await.history.clone()
    }

    /// The currently displayed toast, if one has not expired yet.
    pub async fn active_toast(&self) -> Option<Notification> {
        self.inner.read().await.toast.clone()
    }
}
