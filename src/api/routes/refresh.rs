use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::ApiError;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub fetched_at: DateTime<Utc>,
    pub teams: usize,
    pub fixtures: usize,
    pub players: usize,
}

/// Reload the snapshot from upstream now, bypassing the TTL and disk cache.
///
/// On failure the previous snapshot stays in place and the error is reported
/// as unavailable.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshResponse>, ApiError> {
    let snapshot = state
        .store
        .refresh()
        .await
        .map_err(|e| ApiError::Unavailable(format!("refresh failed: {}", e)))?;

    Ok(Json(RefreshResponse {
        fetched_at: snapshot.fetched_at,
        teams: snapshot.teams.len(),
        fixtures: snapshot.fixtures.len(),
        players: snapshot.players.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{get_json, league, post_json, state_with};
    use crate::api::build_router;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_refresh_forces_reload() {
        let (source, state) = state_with(league());
        let app = build_router(state);

        let (status, _) = get_json(app.clone(), "/api/teams").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(source.loads(), 1);

        let (status, json) = post_json(app.clone(), "/api/refresh", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["teams"], 3);
        assert_eq!(json["players"], 6);
        assert_eq!(source.loads(), 2);
        assert_eq!(source.forced.load(Ordering::SeqCst), 1);

        // Fresh after the refresh, so no further load
        get_json(app, "/api/teams").await;
        assert_eq!(source.loads(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_serving() {
        let (source, state) = state_with(league());
        let app = build_router(state);

        get_json(app.clone(), "/api/teams").await;
        source.fail(true);

        let (status, json) = post_json(app.clone(), "/api/refresh", "").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("refresh failed"));

        let (status, json) = get_json(app, "/api/teams").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_requires_post() {
        let (_, state) = state_with(league());
        let (status, _) = get_json(build_router(state), "/api/refresh").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
