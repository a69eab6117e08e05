//! # FPL Analytics
//!
//! Fantasy Premier League statistics: granular fixture difficulty, rolling
//! difficulty, team summaries and a player table, over the public FPL API.
//!
//! ## Architecture
//!
//! - **models**: Upstream records (teams, fixtures, players) and derived stats
//! - **fetch**: FPL API client, disk cache and the in-memory snapshot store
//! - **calculate**: Pure derivations over one snapshot
//! - **export**: Tabular/CSV rendering of derived results
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod export;
pub mod fetch;
pub mod models;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "1h", "5m", "300s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
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
