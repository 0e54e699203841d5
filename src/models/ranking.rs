//! Ranked platform lists.

use serde::{Deserialize, Serialize};

use super::PlatformSnapshot;

/// An ordered leaderboard of platform snapshots.
///
/// Always sorted descending by `total_score` (ties keep input order) and
/// free of duplicate platforms. Replaced wholesale each poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedList {
    entries: Vec<PlatformSnapshot>,
}

impl RankedList {
    /// Build a ranked list from a cycle's snapshots.
    ///
    /// Duplicate platforms are dropped (first occurrence wins) before the
    /// stable descending sort.
    pub fn new(snapshots: Vec<PlatformSnapshot>) -> Self {
        let mut entries: Vec<PlatformSnapshot> = Vec::with_capacity(snapshots.len());
        for snap in snapshots {
            if !entries.iter().any(|e| e.platform == snap.platform) {
                entries.push(snap);
            }
        }

        entries.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        Self { entries }
    }

    /// The empty list (session-start baseline).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Top-ranked platform, if any.
    pub fn leader(&self) -> Option<&PlatformSnapshot> {
        self.entries.first()
    }

    /// Zero-based position of a platform.
    pub fn position_of(&self, platform: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.platform == platform)
    }

    /// Snapshot for a platform, if present.
    pub fn get(&self, platform: &str) -> Option<&PlatformSnapshot> {
        self.entries.iter().find(|e| e.platform == platform)
    }

    pub fn entries(&self) -> &[PlatformSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlatformSnapshot> {
        self.entries.iter()
    }
}
