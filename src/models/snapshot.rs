//! Per-platform metric snapshots.

use serde::{Deserialize, Serialize};

/// Weight applied to conversions in the composite score.
pub const CONVERSION_WEIGHT: f64 = 10.0;

/// Weight applied to ROI in the composite score.
pub const ROI_WEIGHT: f64 = 100.0;

/// Normalized metrics for one platform in one poll cycle.
///
/// Created fresh every cycle from fetched metrics and never mutated in
/// place; the previous cycle's snapshot set survives only as the
/// comparison baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    /// Platform identifier (e.g. "Instagram")
    pub platform: String,

    /// Click count, rounded to the nearest integer
    pub clicks: u64,

    /// Impression count, rounded to the nearest integer
    pub impressions: u64,

    /// Conversion count, rounded to the nearest integer
    pub conversions: u64,

    /// Return-on-investment ratio
    pub roi: f64,

    /// Composite performance score, see [`compute_score`]
    pub total_score: f64,
}

impl PlatformSnapshot {
    /// Build a snapshot from raw metric values.
    ///
    /// Counters are clamped to zero and rounded once here; the rounded
    /// values feed both the score and display.
    pub fn new(
        platform: impl Into<String>,
        clicks: f64,
        impressions: f64,
        conversions: f64,
        roi: f64,
    ) -> Self {
        let clicks = clicks.max(0.0).round() as u64;
        let impressions = impressions.max(0.0).round() as u64;
        let conversions = conversions.max(0.0).round() as u64;
        let roi = roi.max(0.0);

        Self {
            platform: platform.into(),
            clicks,
            impressions,
            conversions,
            roi,
            total_score: compute_score(clicks, impressions, conversions, roi),
        }
    }
}

/// Composite performance score blending the four tracked metrics.
pub fn compute_score(clicks: u64, impressions: u64, conversions: u64, roi: f64) -> f64 {
    clicks as f64 + impressions as f64 + conversions as f64 * CONVERSION_WEIGHT + roi * ROI_WEIGHT
}
