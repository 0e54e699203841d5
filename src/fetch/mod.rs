//! Stats retrieval from the campaign backend.
//!
//! Fetches per-platform metric snapshots over HTTP. The bulk endpoint is
//! tried first; when it returns anything other than a non-empty array, one
//! request per configured platform is issued concurrently and platforms
//! whose request fails are dropped from the cycle.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::models::PlatformSnapshot;

/// Errors that can occur during stats fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
}

/// Raw metric fields as the backend reports them.
///
/// Every field is optional on the wire; anything missing counts as zero.
/// Fields this service does not score (cost, ctr, cpc) are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    #[serde(default)]
    pub clicks: f64,

    #[serde(default)]
    pub impressions: f64,

    #[serde(default)]
    pub conversions: f64,

    #[serde(default)]
    pub roi: f64,

    #[serde(default)]
    pub cost: f64,

    #[serde(default)]
    pub ctr: f64,

    #[serde(default)]
    pub cpc: f64,
}

/// One platform's stats record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlatformStats {
    pub platform: String,

    /// Missing metrics object means all-zero metrics
    #[serde(default)]
    pub metrics: Option<RawMetrics>,
}

impl RawPlatformStats {
    /// Convenience constructor for tests and scripted sources.
    pub fn new(platform: &str, clicks: f64, impressions: f64, conversions: f64, roi: f64) -> Self {
        Self {
            platform: platform.to_string(),
            metrics: Some(RawMetrics {
                clicks,
                impressions,
                conversions,
                roi,
                ..RawMetrics::default()
            }),
        }
    }

    /// Normalize into a snapshot; absent metrics become zeros.
    pub fn into_snapshot(self) -> PlatformSnapshot {
        let metrics = self.metrics.unwrap_or_default();
        PlatformSnapshot::new(
            self.platform,
            metrics.clicks,
            metrics.impressions,
            metrics.conversions,
            metrics.roi,
        )
    }
}

/// Source of per-platform stats records.
///
/// Abstracts the HTTP client so the monitor can run against scripted data
/// in tests and demos.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch stats for the current cycle. Partial results are fine; an
    /// empty list means the cycle should be skipped.
    async fn fetch_all(&self) -> Result<Vec<RawPlatformStats>, FetchError>;
}

/// Interpret a bulk-endpoint body. Only a non-empty JSON array is usable;
/// anything else (object sentinel, empty array) triggers the fallback.
/// Malformed array entries are dropped individually.
fn usable_bulk(body: serde_json::Value) -> Option<Vec<RawPlatformStats>> {
    let items = body.as_array()?;
    if items.is_empty() {
        return None;
    }

    let records: Vec<RawPlatformStats> = items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Dropping malformed bulk stats entry: {}", e);
                None
            }
        })
        .collect();

    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// HTTP stats client for the campaign backend.
#[derive(Clone)]
pub struct StatsClient {
    client: reqwest::Client,
    base_url: String,
    platforms: Vec<String>,
}

impl StatsClient {
    /// Create a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            platforms: config.platforms.clone(),
        })
    }

    /// Fetch the bulk stats endpoint.
    async fn fetch_bulk(&self) -> Result<serde_json::Value, FetchError> {
        let url = format!("{}/api/platforms/all/stats", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch a single platform's stats.
    async fn fetch_platform(&self, platform: &str) -> Result<RawPlatformStats, FetchError> {
        let url = format!("{}/api/platforms/{}/stats", self.base_url, platform);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// One request per configured platform, issued concurrently.
    /// Failed platforms are dropped from the cycle.
    async fn fetch_fallback(&self) -> Vec<RawPlatformStats> {
        let handles: Vec<_> = self
            .platforms
            .iter()
            .map(|platform| {
                let client = self.clone();
                let platform = platform.clone();
                tokio::spawn(async move {
                    match client.fetch_platform(&platform).await {
                        Ok(record) => Some(record),
                        Err(e) => {
                            warn!("Dropping {} from cycle: {}", platform, e);
                            None
                        }
                    }
                })
            })
            .collect();

        let mut records = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(Some(record)) = handle.await {
                records.push(record);
            }
        }
        records
    }
}

#[async_trait]
impl StatsSource for StatsClient {
    async fn fetch_all(&self) -> Result<Vec<RawPlatformStats>, FetchError> {
        match self.fetch_bulk().await {
            Ok(body) => {
                if let Some(records) = usable_bulk(body) {
                    return Ok(records);
                }
                debug!("Bulk stats unusable, falling back to per-platform requests");
            }
            Err(e) => {
                debug!("Bulk stats request failed ({}), falling back", e);
            }
        }

        Ok(self.fetch_fallback().await)
    }
}

/// Replays scripted cycles; used by tests and the `demo` subcommand.
///
/// Returns one scripted cycle per call and empty results once exhausted.
pub struct StaticSource {
    cycles: Mutex<VecDeque<Vec<RawPlatformStats>>>,
}

impl StaticSource {
    pub fn new(cycles: Vec<Vec<RawPlatformStats>>) -> Self {
        Self {
            cycles: Mutex::new(cycles.into()),
        }
    }
}

#[async_trait]
impl StatsSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<RawPlatformStats>, FetchError> {
        let mut cycles = self.cycles.lock().expect("cycle queue poisoned");
        Ok(cycles.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_stats_parse_full() {
        let record: RawPlatformStats = serde_json::from_value(json!({
            "platform": "Instagram",
            "metrics": {
                "clicks": 120.0,
                "impressions": 4500.0,
                "conversions": 30.0,
                "roi": 2.4,
                "cost": 800.0,
                "ctr": 0.026,
                "cpc": 6.6
            }
        }))
        .unwrap();

        assert_eq!(record.platform, "Instagram");
        assert_eq!(record.metrics.as_ref().unwrap().clicks, 120.0);
        assert_eq!(record.metrics.as_ref().unwrap().roi, 2.4);
    }

    #[test]
    fn test_raw_stats_missing_fields_default_to_zero() {
        let record: RawPlatformStats = serde_json::from_value(json!({
            "platform": "Email",
            "metrics": { "clicks": 10.0 }
        }))
        .unwrap();

        let metrics = record.metrics.unwrap();
        assert_eq!(metrics.clicks, 10.0);
        assert_eq!(metrics.impressions, 0.0);
        assert_eq!(metrics.conversions, 0.0);
        assert_eq!(metrics.roi, 0.0);
    }

    #[test]
    fn test_raw_stats_missing_metrics_object() {
        let record: RawPlatformStats =
            serde_json::from_value(json!({ "platform": "Twitter" })).unwrap();

        let snap = record.into_snapshot();
        assert_eq!(snap.platform, "Twitter");
        assert_eq!(snap.total_score, 0.0);
    }

    #[test]
    fn test_into_snapshot_scores_rounded_values() {
        let record = RawPlatformStats::new("Facebook", 100.4, 1000.0, 10.0, 1.5);
        let snap = record.into_snapshot();

        assert_eq!(snap.clicks, 100);
        assert_eq!(snap.total_score, 100.0 + 1000.0 + 100.0 + 150.0);
    }

    #[test]
    fn test_usable_bulk_accepts_nonempty_array() {
        let body = json!([
            { "platform": "Instagram", "metrics": { "clicks": 1.0 } },
            { "platform": "Email" }
        ]);

        let records = usable_bulk(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_usable_bulk_rejects_empty_array() {
        assert!(usable_bulk(json!([])).is_none());
    }

    #[test]
    fn test_usable_bulk_rejects_non_array() {
        assert!(usable_bulk(json!({ "detail": "no stats" })).is_none());
        assert!(usable_bulk(json!(null)).is_none());
    }

    #[test]
    fn test_usable_bulk_drops_malformed_entries() {
        let body = json!([
            { "platform": "Instagram" },
            { "metrics": { "clicks": 5.0 } }
        ]);

        let records = usable_bulk(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].platform, "Instagram");
    }

    #[tokio::test]
    async fn test_static_source_replays_cycles_in_order() {
        let source = StaticSource::new(vec![
            vec![RawPlatformStats::new("A", 1.0, 0.0, 0.0, 0.0)],
            vec![RawPlatformStats::new("B", 2.0, 0.0, 0.0, 0.0)],
        ]);

        let first = source.fetch_all().await.unwrap();
        assert_eq!(first[0].platform, "A");

        let second = source.fetch_all().await.unwrap();
        assert_eq!(second[0].platform, "B");

        // Exhausted
        assert!(source.fetch_all().await.unwrap().is_empty());
    }

    #[test]
    fn test_stats_client_construction() {
        let config = BackendConfig::default();
        let client = StatsClient::new(&config).unwrap();

        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.platforms.len(), 5);
    }

    #[test]
    fn test_stats_client_trims_trailing_slash() {
        let config = BackendConfig {
            base_url: "http://backend:9000/".to_string(),
            ..BackendConfig::default()
        };
        let client = StatsClient::new(&config).unwrap();

        assert_eq!(client.base_url, "http://backend:9000");
    }
}
