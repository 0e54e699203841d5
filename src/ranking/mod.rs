//! Ranking engine.
//!
//! Turns a cycle's snapshots into a ranked leaderboard and classifies the
//! differences against the previous cycle:
//! 1. Leader change (a platform overtook the previous best)
//! 2. Position changes (climbs surfaced, drops logged only)
//! 3. Performance surges (score jumps past the threshold, positive only)

use serde::Serialize;

use crate::models::{NotificationKind, PlatformSnapshot, RankedList};

/// Absolute percent change a score must exceed to classify as a surge.
pub const SURGE_THRESHOLD_PCT: f64 = 15.0;

/// A classified difference between two consecutive rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RankChange {
    /// The top spot changed hands
    NewLeader {
        platform: String,
        overtook: String,
        score: f64,
    },

    /// A platform climbed in the ranking
    Rise {
        platform: String,
        positions: usize,
        /// 1-based rank after the climb
        new_rank: usize,
    },

    /// A platform dropped in the ranking. Never surfaced as a notification.
    Fall { platform: String, positions: usize },

    /// Score changed by more than the threshold. Signed percent; only
    /// positive surges are surfaced.
    Surge { platform: String, percent: f64 },
}

impl RankChange {
    /// Render as a notification. Returns `None` for changes that are
    /// tracked but not surfaced (falls, negative surges).
    pub fn to_notification(&self) -> Option<(NotificationKind, String)> {
        match self {
            RankChange::NewLeader {
                platform,
                overtook,
                score,
            } => Some((
                NotificationKind::NewLeader,
                format!(
                    "{} overtook {} as the top performing platform ({:.0} pts)",
                    platform, overtook, score
                ),
            )),
            RankChange::Rise {
                platform,
                positions,
                new_rank,
            } => {
                let noun = if *positions == 1 { "position" } else { "positions" };
                Some((
                    NotificationKind::PlatformRise,
                    format!(
                        "{} moved up {} {} to rank {}",
                        platform, positions, noun, new_rank
                    ),
                ))
            }
            RankChange::Fall { .. } => None,
            RankChange::Surge { platform, percent } => {
                if *percent > 0.0 {
                    Some((
                        NotificationKind::PerformanceSurge,
                        format!(
                            "{} performance surged {:.1}% since the last check",
                            platform, percent
                        ),
                    ))
                } else {
                    None
                }
            }
        }
    }
}

/// Stateful ranking engine holding the previous cycle's leaderboard.
///
/// The baseline starts empty at session start and is replaced wholesale
/// after every observed cycle; it is never mutated in place.
#[derive(Debug, Default)]
pub struct RankingEngine {
    baseline: Option<RankedList>,
}

impl RankingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The previous cycle's leaderboard, if one has been established.
    pub fn baseline(&self) -> Option<&RankedList> {
        self.baseline.as_ref()
    }

    /// Rank a cycle's snapshots, classify changes against the baseline,
    /// and adopt the new ranking as the next baseline.
    ///
    /// The first observed cycle establishes the baseline and classifies
    /// nothing. Callers skip cycles that produced zero snapshots.
    pub fn observe(&mut self, snapshots: Vec<PlatformSnapshot>) -> Vec<RankChange> {
        let current = RankedList::new(snapshots);

        let changes = match &self.baseline {
            Some(previous) if !previous.is_empty() => diff(previous, &current),
            _ => Vec::new(),
        };

        self.baseline = Some(current);
        changes
    }
}

/// Classify the differences between two rankings.
fn diff(previous: &RankedList, current: &RankedList) -> Vec<RankChange> {
    let mut changes = Vec::new();

    // 1. Leader change
    if let (Some(cur), Some(prev)) = (current.leader(), previous.leader()) {
        if cur.platform != prev.platform {
            changes.push(RankChange::NewLeader {
                platform: cur.platform.clone(),
                overtook: prev.platform.clone(),
                score: cur.total_score,
            });
        }
    }

    // 2. Position changes, for platforms present in both lists
    for (cur_idx, snap) in current.iter().enumerate() {
        if let Some(prev_idx) = previous.position_of(&snap.platform) {
            let delta = prev_idx as i64 - cur_idx as i64;
            if delta > 0 {
                changes.push(RankChange::Rise {
                    platform: snap.platform.clone(),
                    positions: delta as usize,
                    new_rank: cur_idx + 1,
                });
            } else if delta < 0 {
                changes.push(RankChange::Fall {
                    platform: snap.platform.clone(),
                    positions: (-delta) as usize,
                });
            }
        }
    }

    // 3. Performance surges, for platforms with a positive previous score
    for snap in current.iter() {
        if let Some(prev) = previous.get(&snap.platform) {
            if prev.total_score > 0.0 {
                let percent =
                    (snap.total_score - prev.total_score) / prev.total_score * 100.0;
                if percent.abs() > SURGE_THRESHOLD_PCT {
                    changes.push(RankChange::Surge {
                        platform: snap.platform.clone(),
                        percent,
                    });
                }
            }
        }
    }

    changes
}
