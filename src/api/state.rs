use std::sync::Arc;

use crate::monitor::PlatformMonitor;
use crate::notify::NotificationSink;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<PlatformMonitor>,
    pub sink: NotificationSink,
}

impl AppState {
    /// Bundle a monitor and the sink it publishes to.
    pub fn new(monitor: Arc<PlatformMonitor>) -> Self {
        let sink = monitor.sink().clone();
        Self { monitor, sink }
    }
}
