//! Poll scheduler.
//!
//! Drives the fetch → rank → notify cycle:
//! 1. Fetch per-platform stats from the configured source
//! 2. Rank and diff against the previous cycle's baseline
//! 3. Surface classified changes through the notification sink
//!
//! Cycles run inline in a single polling task, so a new tick cannot start
//! while the previous cycle is still awaiting the network and baseline
//! replacements happen in completion order.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::fetch::StatsSource;
use crate::models::{NotificationKind, PlatformSnapshot, RankedList};
use crate::notify::NotificationSink;
use crate::ranking::{RankChange, RankingEngine};

/// Delay before the opt-in demo seed notification fires.
const DEMO_SEED_DELAY: Duration = Duration::from_millis(3000);

/// Current monitor state, exposed over the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub last_cycle_started: Option<DateTime<Utc>>,
    pub last_cycle_completed: Option<DateTime<Utc>>,
    pub cycles_completed: u64,
    pub notifications_emitted: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct CycleStats {
    last_cycle_started: Option<DateTime<Utc>>,
    last_cycle_completed: Option<DateTime<Utc>>,
    cycles_completed: u64,
    notifications_emitted: u64,
    last_error: Option<String>,
}

/// Platform ranking monitor.
///
/// Owns the session state: the ranking baseline, cycle bookkeeping, and
/// the polling task handle. Constructed at application start, torn down
/// with [`PlatformMonitor::stop`].
pub struct PlatformMonitor {
    config: MonitorConfig,
    source: Arc<dyn StatsSource>,
    sink: NotificationSink,
    engine: Mutex<RankingEngine>,
    stats: RwLock<CycleStats>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    seed_task: Mutex<Option<JoinHandle<()>>>,
}

impl PlatformMonitor {
    pub fn new(config: MonitorConfig, source: Arc<dyn StatsSource>, sink: NotificationSink) -> Self {
        Self {
            config,
            source,
            sink,
            engine: Mutex::new(RankingEngine::new()),
            stats: RwLock::new(CycleStats::default()),
            poll_task: Mutex::new(None),
            seed_task: Mutex::new(None),
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms)
    }

    /// The sink this monitor publishes to.
    pub fn sink(&self) -> &NotificationSink {
        &self.sink
    }

    /// Start polling: one immediate cycle, then one per interval.
    /// No-op when already running.
    pub async fn start(self: Arc<Self>) {
        let mut task = self.poll_task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("Monitor already running");
            return;
        }

        info!("Starting platform monitor (every {:?})", self.poll_interval());

        if self.config.demo_seed {
            let sink = self.sink.clone();
            *self.seed_task.lock().await = Some(tokio::spawn(async move {
                tokio::time::sleep(DEMO_SEED_DELAY).await;
                sink.record(
                    NotificationKind::NewLeader,
                    "Instagram overtook Facebook as the top performing platform (demo)",
                )
                .await;
            }));
        }

        let monitor = self.clone();
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(monitor.poll_interval());
            loop {
                ticker.tick().await;
                monitor.run_cycle().await;
            }
        }));
    }

    /// Stop polling and cancel any pending tick so nothing fires after
    /// teardown. No-op when already stopped.
    pub async fn stop(&self) {
        let mut task = self.poll_task.lock().await;
        match task.take() {
            Some(handle) => {
                handle.abort();
                info!("Platform monitor stopped");
            }
            None => debug!("Monitor already stopped"),
        }

        if let Some(seed) = self.seed_task.lock().await.take() {
            seed.abort();
        }
    }

    pub async fn is_running(&self) -> bool {
        self.poll_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Run one cycle immediately, regardless of running state. Does not
    /// alter the polling schedule.
    pub async fn force_check(&self) {
        self.run_cycle().await;
    }

    /// Demo/test hook: fabricate a ranking shakeup (bypassing fetch) and
    /// push it through the diff/notify path deterministically.
    pub async fn force_ranking_change(&self) {
        let changes = {
            let mut engine = self.engine.lock().await;
            if engine.baseline().is_none_or(|b| b.is_empty()) {
                engine.observe(demo_baseline());
            }
            let baseline = engine.baseline().cloned().unwrap_or_default();
            engine.observe(fabricate_shakeup(&baseline))
        };
        self.publish(&changes).await;
    }

    /// Current baseline ranking (empty until the first successful cycle).
    pub async fn rankings(&self) -> RankedList {
        self.engine
            .lock()
            .await
            .baseline()
            .cloned()
            .unwrap_or_default()
    }

    pub async fn status(&self) -> MonitorStatus {
        let stats = self.stats.read().await.clone();
        MonitorStatus {
            running: self.is_running().await,
            last_cycle_started: stats.last_cycle_started,
            last_cycle_completed: stats.last_cycle_completed,
            cycles_completed: stats.cycles_completed,
            notifications_emitted: stats.notifications_emitted,
            last_error: stats.last_error,
        }
    }

    /// One fetch → rank → notify pass. Failures are absorbed: the cycle
    /// becomes a no-op and the baseline is retained for the next tick.
    async fn run_cycle(&self) {
        self.stats.write().await.last_cycle_started = Some(Utc::now());

        let records = match self.source.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Stats fetch failed, skipping cycle: {}", e);
                self.stats.write().await.last_error = Some(e.to_string());
                return;
            }
        };

        if records.is_empty() {
            debug!("No platform stats this cycle, baseline retained");
            return;
        }

        let snapshots: Vec<PlatformSnapshot> =
            records.into_iter().map(|r| r.into_snapshot()).collect();

        let changes = {
            let mut engine = self.engine.lock().await;
            engine.observe(snapshots)
        };
        self.publish(&changes).await;

        let mut stats = self.stats.write().await;
        stats.cycles_completed += 1;
        stats.last_cycle_completed = Some(Utc::now());
        stats.last_error = None;
    }

    /// Surface classified changes; drops and negative surges are logged only.
    async fn publish(&self, changes: &[RankChange]) {
        let mut emitted = 0u64;
        for change in changes {
            match change.to_notification() {
                Some((kind, message)) => {
                    info!("{}", message);
                    self.sink.record(kind, message).await;
                    emitted += 1;
                }
                None => debug!("Unsurfaced ranking change: {:?}", change),
            }
        }

        if emitted > 0 {
            self.stats.write().await.notifications_emitted += emitted;
        }
    }
}

/// Canned leaderboard used when a shakeup is forced before any real cycle.
fn demo_baseline() -> Vec<PlatformSnapshot> {
    vec![
        PlatformSnapshot::new("Instagram", 1200.0, 45000.0, 90.0, 2.4),
        PlatformSnapshot::new("Facebook", 980.0, 38000.0, 70.0, 1.9),
        PlatformSnapshot::new("Google Ads", 1500.0, 30000.0, 110.0, 2.1),
        PlatformSnapshot::new("Twitter", 640.0, 22000.0, 35.0, 1.2),
        PlatformSnapshot::new("Email", 410.0, 9000.0, 55.0, 3.1),
    ]
}

/// Promote the bottom platform past the current leader. Guarantees a
/// leader change, a rank climb, and a surge for multi-platform baselines.
fn fabricate_shakeup(baseline: &RankedList) -> Vec<PlatformSnapshot> {
    let leader_score = baseline.leader().map(|l| l.total_score).unwrap_or(0.0);

    let mut snapshots: Vec<PlatformSnapshot> = baseline.iter().cloned().collect();
    if let Some(last) = snapshots.pop() {
        let target = (leader_score * 1.5).max(100.0);
        snapshots.insert(0, PlatformSnapshot::new(last.platform, target, 0.0, 0.0, 0.0));
    }
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{RawPlatformStats, StaticSource};

    fn monitor_with_cycles(cycles: Vec<Vec<RawPlatformStats>>) -> Arc<PlatformMonitor> {
        Arc::new(PlatformMonitor::new(
            MonitorConfig::default(),
            Arc::new(StaticSource::new(cycles)),
            NotificationSink::new(),
        ))
    }

    fn cycle(entries: &[(&str, f64)]) -> Vec<RawPlatformStats> {
        entries
            .iter()
            .map(|(platform, clicks)| RawPlatformStats::new(platform, *clicks, 0.0, 0.0, 0.0))
            .collect()
    }

    #[tokio::test]
    async fn test_first_cycle_establishes_baseline_without_notifications() {
        let monitor = monitor_with_cycles(vec![cycle(&[("A", 100.0), ("B", 90.0)])]);

        monitor.force_check().await;

        assert!(monitor.sink().history().await.is_empty());
        let rankings = monitor.rankings().await;
        assert_eq!(rankings.leader().unwrap().platform, "A");

        let status = monitor.status().await;
        assert_eq!(status.cycles_completed, 1);
        assert_eq!(status.notifications_emitted, 0);
    }

    #[tokio::test]
    async fn test_overtake_cycle_surfaces_notifications() {
        let monitor = monitor_with_cycles(vec![
            cycle(&[("A", 100.0), ("B", 90.0), ("C", 80.0)]),
            cycle(&[("B", 110.0), ("A", 100.0), ("C", 80.0)]),
        ]);

        monitor.force_check().await;
        monitor.force_check().await;

        let history = monitor.sink().history().await;
        let kinds: Vec<NotificationKind> = history.iter().map(|n| n.kind).collect();

        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == NotificationKind::NewLeader)
                .count(),
            1
        );
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == NotificationKind::PlatformRise)
                .count(),
            1
        );
        // No fall notification for A
        assert!(!kinds.contains(&NotificationKind::PlatformFall));
    }

    #[tokio::test]
    async fn test_empty_cycle_retains_baseline() {
        let monitor = monitor_with_cycles(vec![
            cycle(&[("A", 100.0)]),
            Vec::new(),
            cycle(&[("A", 120.0)]),
        ]);

        monitor.force_check().await;
        monitor.force_check().await; // empty: skipped
        assert_eq!(monitor.status().await.cycles_completed, 1);
        assert_eq!(monitor.rankings().await.len(), 1);

        // The surge is computed against the retained baseline
        monitor.force_check().await;
        let history = monitor.sink().history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, NotificationKind::PerformanceSurge);
        assert!(history[0].message.contains("20.0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let monitor = monitor_with_cycles(vec![cycle(&[("A", 100.0)])]);

        monitor.clone().start().await;
        monitor.clone().start().await;

        assert!(monitor.is_running().await);

        monitor.stop().await;
        assert!(!monitor.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_cycles() {
        let many: Vec<Vec<RawPlatformStats>> =
            (0..10).map(|_| cycle(&[("A", 100.0)])).collect();
        let monitor = monitor_with_cycles(many);

        monitor.clone().start().await;
        // Let the immediate first cycle run
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(monitor.status().await.cycles_completed, 1);

        monitor.stop().await;

        // Three poll intervals later: no further cycles
        tokio::time::sleep(Duration::from_millis(30_000)).await;
        assert_eq!(monitor.status().await.cycles_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_runs_on_interval() {
        let many: Vec<Vec<RawPlatformStats>> =
            (0..5).map(|_| cycle(&[("A", 100.0)])).collect();
        let monitor = monitor_with_cycles(many);

        monitor.clone().start().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(monitor.status().await.cycles_completed, 1);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert_eq!(monitor.status().await.cycles_completed, 2);

        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_force_check_works_while_stopped() {
        let monitor = monitor_with_cycles(vec![cycle(&[("A", 100.0)])]);

        assert!(!monitor.is_running().await);
        monitor.force_check().await;

        assert_eq!(monitor.status().await.cycles_completed, 1);
        assert!(!monitor.is_running().await);
    }

    #[tokio::test]
    async fn test_force_ranking_change_is_deterministic() {
        let monitor = monitor_with_cycles(Vec::new());

        monitor.force_ranking_change().await;

        let history = monitor.sink().history().await;
        assert!(!history.is_empty());
        assert!(history
            .iter()
            .any(|n| n.kind == NotificationKind::NewLeader));
    }

    #[tokio::test]
    async fn test_force_ranking_change_builds_on_real_baseline() {
        let monitor = monitor_with_cycles(vec![cycle(&[("A", 100.0), ("B", 90.0)])]);

        monitor.force_check().await;
        monitor.force_ranking_change().await;

        // B was bottom-ranked and is promoted past A
        let rankings = monitor.rankings().await;
        assert_eq!(rankings.leader().unwrap().platform, "B");
        assert!(monitor
            .sink()
            .history()
            .await
            .iter()
            .any(|n| n.kind == NotificationKind::NewLeader));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_seed_fires_only_when_enabled() {
        let config = MonitorConfig {
            demo_seed: true,
            ..MonitorConfig::default()
        };
        let monitor = Arc::new(PlatformMonitor::new(
            config,
            Arc::new(StaticSource::new(Vec::new())),
            NotificationSink::new(),
        ));

        monitor.clone().start().await;
        tokio::time::sleep(Duration::from_millis(3100)).await;

        let history = monitor.sink().history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, NotificationKind::NewLeader);

        monitor.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_demo_seed_by_default() {
        let monitor = monitor_with_cycles(Vec::new());

        monitor.clone().start().await;
        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert!(monitor.sink().history().await.is_empty());
        monitor.stop().await;
    }

    #[test]
    fn test_fabricate_shakeup_promotes_bottom_platform() {
        let baseline = RankedList::new(demo_baseline());
        let bottom = baseline.entries().last().unwrap().platform.clone();
        let leader_score = baseline.leader().unwrap().total_score;

        let shaken = RankedList::new(fabricate_shakeup(&baseline));

        assert_eq!(shaken.leader().unwrap().platform, bottom);
        assert!(shaken.leader().unwrap().total_score > leader_score);
        assert_eq!(shaken.len(), baseline.len());
    }

    #[test]
    fn test_monitor_status_serialization() {
        let status = MonitorStatus {
            running: true,
            last_cycle_started: Some(Utc::now()),
            last_cycle_completed: None,
            cycles_completed: 3,
            notifications_emitted: 2,
            last_error: None,
        };

        let json = serde_json::to_string(&status).unwrap();
        let parsed: MonitorStatus = serde_json::from_str(&json).unwrap();
        assert!(parsed.running);
        assert_eq!(parsed.cycles_completed, 3);
    }
}
