//! Fantasy Premier League API client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::models::{Fixture, Player, Snapshot, Team};

use super::{FetchError, Fetcher};

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api/";

const BOOTSTRAP_PATH: &str = "bootstrap-static/";
const FIXTURES_PATH: &str = "fixtures/";

/// Anything that can produce a full snapshot.
///
/// `force` asks the source to bypass whatever caching it does itself.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn load(&self, force: bool) -> Result<Snapshot, FetchError>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// The subset of `bootstrap-static` we read.
#[derive(Debug, Deserialize)]
struct Bootstrap {
    teams: Vec<Team>,
    #[serde(default)]
    elements: Vec<Player>,
}

/// Client for the two public FPL endpoints.
pub struct FplClient {
    fetcher: Fetcher,
    base_url: Url,
}

impl FplClient {
    pub fn new(fetcher: Fetcher, base_url: &str) -> Result<Self, FetchError> {
        // Url::join drops the last segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        Ok(Self { fetcher, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn bootstrap(&self, force: bool) -> Result<(Bootstrap, DateTime<Utc>), FetchError> {
        let url = self.endpoint(BOOTSTRAP_PATH)?;
        let (bootstrap, result): (Bootstrap, _) = self.fetcher.fetch_json(&url, force).await?;
        debug!(
            "bootstrap-static: {} teams, {} players (cached: {})",
            bootstrap.teams.len(),
            bootstrap.elements.len(),
            result.from_cache
        );
        Ok((bootstrap, result.fetched_at))
    }

    async fn fixtures(&self, force: bool) -> Result<(Vec<Fixture>, DateTime<Utc>), FetchError> {
        let url = self.endpoint(FIXTURES_PATH)?;
        let (fixtures, result): (Vec<Fixture>, _) = self.fetcher.fetch_json(&url, force).await?;
        debug!("fixtures: {} (cached: {})", fixtures.len(), result.from_cache);
        Ok((fixtures, result.fetched_at))
    }
}

#[async_trait]
impl SnapshotSource for FplClient {
    async fn load(&self, force: bool) -> Result<Snapshot, FetchError> {
        let ((bootstrap, bootstrap_at), (fixtures, fixtures_at)) =
            tokio::try_join!(self.bootstrap(force), self.fixtures(force))?;

        // The older of the two responses dates the snapshot
        let fetched_at = bootstrap_at.min(fixtures_at);
        let snapshot = Snapshot::new(bootstrap.teams, fixtures, bootstrap.elements, fetched_at);

        info!(
            "Loaded snapshot: {} teams, {} fixtures, {} players",
            snapshot.teams.len(),
            snapshot.fixtures.len(),
            snapshot.players.len()
        );
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        self.base_url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetcherConfig, SnapshotStore};
    use crate::models::{TeamId, Venue};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const BOOTSTRAP_JSON: &str = r#"{
        "events": [{"id": 1, "name": "Gameweek 1"}],
        "teams": [
            {"id": 1, "name": "Arsenal", "short_name": "ARS", "strength": 4,
             "strength_overall_home": 1300, "strength_overall_away": 1330,
             "strength_attack_home": 1290, "strength_attack_away": 1320,
             "strength_defence_home": 1310, "strength_defence_away": 1340},
            {"id": 2, "name": "Aston Villa", "short_name": "AVL", "strength": 3,
             "strength_overall_home": 1150, "strength_overall_away": 1180,
             "strength_attack_home": 1140, "strength_attack_away": 1170,
             "strength_defence_home": 1160, "strength_defence_away": 1190}
        ],
        "elements": [
            {"id": 7, "web_name": "Saka", "first_name": "Bukayo", "second_name": "Saka",
             "team": 1, "element_type": 3, "now_cost": 100, "total_points": 180,
             "points_per_game": "5.6", "form": "6.0", "selected_by_percent": "45.2",
             "photo": "p7.jpg"}
        ]
    }"#;

    const FIXTURES_JSON: &str = r#"[
        {"id": 2, "event": 1, "team_h": 2, "team_a": 1, "finished": false,
         "kickoff_time": "2024-08-17T14:00:00Z",
         "team_h_difficulty": 4, "team_a_difficulty": 3,
         "team_h_score": null, "team_a_score": null},
        {"id": 9, "event": null, "team_h": 1, "team_a": 2, "finished": false,
         "kickoff_time": null,
         "team_h_difficulty": 3, "team_a_difficulty": 4}
    ]"#;

    /// A client whose disk cache is pre-seeded, so no request leaves the box.
    async fn seeded_client(temp_dir: &TempDir) -> FplClient {
        seeded_client_at(temp_dir, "http://fpl.test/api", Utc::now()).await
    }

    async fn seeded_client_at(
        temp_dir: &TempDir,
        base_url: &str,
        cached_at: DateTime<Utc>,
    ) -> FplClient {
        let config = FetcherConfig {
            cache_dir: temp_dir.path().to_path_buf(),
            cache_ttl: Duration::from_secs(300),
            timeout: Duration::from_secs(2),
            ..FetcherConfig::default()
        };
        let fetcher = Fetcher::new(config).unwrap();
        let client = FplClient::new(fetcher, base_url).unwrap();

        let bootstrap = client.endpoint(BOOTSTRAP_PATH).unwrap();
        let fixtures = client.endpoint(FIXTURES_PATH).unwrap();
        client
            .fetcher
            .write_cache(&bootstrap, BOOTSTRAP_JSON.as_bytes(), None, cached_at)
            .await
            .unwrap();
        client
            .fetcher
            .write_cache(&fixtures, FIXTURES_JSON.as_bytes(), None, cached_at)
            .await
            .unwrap();
        client
    }

    #[test]
    fn test_endpoint_join() {
        let fetcher = Fetcher::with_defaults().unwrap();
        let client = FplClient::new(fetcher, "https://example.com/api").unwrap();

        assert_eq!(
            client.endpoint(BOOTSTRAP_PATH).unwrap().as_str(),
            "https://example.com/api/bootstrap-static/"
        );
        assert_eq!(
            client.endpoint(FIXTURES_PATH).unwrap().as_str(),
            "https://example.com/api/fixtures/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let fetcher = Fetcher::with_defaults().unwrap();
        assert!(matches!(
            FplClient::new(fetcher, "not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_load_parses_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let client = seeded_client(&temp_dir).await;

        let snap = client.load(false).await.unwrap();

        assert_eq!(snap.teams.len(), 2);
        assert_eq!(snap.team_name(TeamId::new(1)), Some("Arsenal"));
        assert_eq!(snap.teams[0].strength_attack_home, 1290.0);

        // Unscheduled fixture sorts last
        assert_eq!(snap.fixtures.len(), 2);
        assert_eq!(snap.fixtures[0].gameweek, Some(1));
        assert_eq!(snap.fixtures[1].gameweek, None);
        assert_eq!(snap.fixtures[0].fpl_difficulty(Venue::Home), Some(4));
        assert!(snap.fixtures[0].kickoff_time.is_some());

        let saka = &snap.players[0];
        assert_eq!(saka.price(), Some(10.0));
        assert_eq!(saka.points_per_game, Some(5.6));
        assert!(saka.extra.contains_key("photo"));
    }

    #[tokio::test]
    async fn test_offline_load_falls_back_to_expired_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cached_at = Utc::now() - chrono::Duration::hours(3);
        // Nothing listens on port 9
        let client = seeded_client_at(&temp_dir, "http://127.0.0.1:9/api", cached_at).await;

        let snap = client.load(false).await.unwrap();
        assert_eq!(snap.teams.len(), 2);
        assert_eq!(snap.fetched_at, cached_at);
    }

    #[tokio::test]
    async fn test_forced_load_fails_when_offline() {
        let temp_dir = TempDir::new().unwrap();
        let cached_at = Utc::now() - chrono::Duration::hours(3);
        let client = seeded_client_at(&temp_dir, "http://127.0.0.1:9/api", cached_at).await;

        assert!(client.load(true).await.is_err());
    }

    #[tokio::test]
    async fn test_store_over_offline_client() {
        let temp_dir = TempDir::new().unwrap();
        let cached_at = Utc::now() - chrono::Duration::hours(3);
        let client = seeded_client_at(&temp_dir, "http://127.0.0.1:9/api", cached_at).await;
        let store = SnapshotStore::new(Arc::new(client), Duration::from_secs(300));

        // Old cached data is served and not refetched on the next request
        let first = store.current().await.unwrap();
        let second = store.current().await.unwrap();
        assert_eq!(first.fetched_at, cached_at);
        assert!(Arc::ptr_eq(&first, &second));

        assert!(store.refresh().await.is_err());
        assert!(Arc::ptr_eq(&store.peek().await.unwrap(), &first));
        assert!(store.status().await.last_error.is_some());
    }
}
