//! # Platform Pulse
//!
//! A monitoring service for marketing platform performance.
//!
//! Polls a campaign backend for per-platform metrics, ranks platforms by a
//! composite performance score, and raises notifications when the ranking
//! shifts (new leader, rank climbs, performance surges).
//!
//! ## Architecture
//!
//! - **models**: Core data structures (snapshots, ranked lists, notifications)
//! - **fetch**: HTTP stats retrieval with per-platform fallback
//! - **ranking**: Composite scoring and cycle-over-cycle diffing
//! - **notify**: Bounded notification history and transient toast state
//! - **monitor**: Poll scheduler driving the fetch→rank→notify cycle
//! - **api**: REST API endpoints for UI collaborators
//! - **config**: Configuration loading and validation

pub mod api;
pub mod config;
pub mod fetch;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod ranking;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "10s", "500ms", "5m").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(n) = s.strip_suffix("ms") {
        let num: u64 = n.parse().ok()?;
        return Some(Duration::from_millis(num));
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_millis() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("10000ms"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_parse_duration_hours() {
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
    }

    #[test]
    fn test_parse_duration_default_seconds() {
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration("10x"), None);
    }

    #[test]
    fn test_parse_duration_empty() {
        assert_eq!(parse_duration(""), None);
    }
}
