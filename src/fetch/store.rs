//! In-memory snapshot cache with a time-to-live.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::models::Snapshot;

use super::{FetchError, SnapshotSource};

/// What the store currently holds, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub loaded: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_seconds: Option<i64>,
    pub stale: bool,
    pub teams: usize,
    pub fixtures: usize,
    pub players: usize,
    pub checked_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Holds the latest snapshot and reloads it from a [`SnapshotSource`] once
/// the last load attempt is older than the TTL.
///
/// Readers always see a complete snapshot: a reload builds a new one and
/// swaps the `Arc`. Reloads are serialized so concurrent requests trigger at
/// most one upstream fetch. A failed reload keeps serving the previous
/// snapshot until the next attempt is due.
///
/// Reload timing follows `checked_at`, not the snapshot's `fetched_at`: a
/// source may hand back old cached data while upstream is down.
pub struct SnapshotStore {
    source: Arc<dyn SnapshotSource>,
    ttl: Duration,
    current: RwLock<Option<Arc<Snapshot>>>,
    checked_at: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
    reload: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(source: Arc<dyn SnapshotSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            checked_at: RwLock::new(None),
            last_error: RwLock::new(None),
            reload: Mutex::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The held snapshot, without reloading.
    pub async fn peek(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }

    fn within_ttl(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(at).to_std() {
            Ok(age) => age < self.ttl,
            // timestamp in the future
            Err(_) => true,
        }
    }

    /// The held snapshot if one exists and the last load attempt is within
    /// the TTL.
    async fn held_if_checked(&self) -> Option<Arc<Snapshot>> {
        let snapshot = self.peek().await?;
        let checked_at = (*self.checked_at.read().await)?;
        self.within_ttl(checked_at, Utc::now()).then_some(snapshot)
    }

    /// The latest snapshot, reloading first when none is held or the last
    /// load attempt has expired. Returns `None` only if nothing has ever
    /// loaded.
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        if let Some(snapshot) = self.held_if_checked().await {
            return Some(snapshot);
        }

        let _guard = self.reload.lock().await;

        // Another task may have reloaded while we waited
        if let Some(snapshot) = self.held_if_checked().await {
            return Some(snapshot);
        }

        match self.load(false).await {
            Ok(snapshot) => Some(snapshot),
            Err(_) => self.peek().await,
        }
    }

    /// Reload now, bypassing every cache layer.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, FetchError> {
        let _guard = self.reload.lock().await;
        self.load(true).await
    }

    async fn load(&self, force: bool) -> Result<Arc<Snapshot>, FetchError> {
        let result = self.source.load(force).await;
        *self.checked_at.write().await = Some(Utc::now());

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write().await = Some(Arc::clone(&snapshot));
                *self.last_error.write().await = None;
                info!(
                    "Snapshot from {} swapped in (fetched {})",
                    self.source.name(),
                    snapshot.fetched_at
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!("Failed to load snapshot from {}: {}", self.source.name(), e);
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn status(&self) -> StoreStatus {
        let now = Utc::now();
        let snapshot = self.peek().await;
        let last_error = self.last_error.read().await.clone();
        let checked_at = *self.checked_at.read().await;

        match snapshot {
            Some(s) => StoreStatus {
                loaded: true,
                fetched_at: Some(s.fetched_at),
                age_seconds: Some(s.age(now).num_seconds()),
                stale: !self.within_ttl(s.fetched_at, now),
                teams: s.teams.len(),
                fixtures: s.fixtures.len(),
                players: s.players.len(),
                checked_at,
                last_error,
            },
            None => StoreStatus {
                loaded: false,
                fetched_at: None,
                age_seconds: None,
                stale: true,
                teams: 0,
                fixtures: 0,
                players: 0,
                checked_at,
                last_error,
            },
        }
    }
}
