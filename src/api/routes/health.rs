use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::fetch::StoreStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ttl_seconds: u64,
    pub snapshot: StoreStatus,
}

/// Liveness plus snapshot age. Never triggers a fetch.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.status().await;
    let status = if snapshot.loaded { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        ttl_seconds: state.store.ttl().as_secs(),
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, get_json};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_before_first_load() {
        let (status, json) = get_json(app(), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["snapshot"]["loaded"], false);
        assert_eq!(json["ttl_seconds"], 300);
    }

    #[tokio::test]
    async fn test_health_after_load() {
        let app = app();
        let (status, _) = get_json(app.clone(), "/api/teams").await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = get_json(app, "/api/health").await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["snapshot"]["teams"], 3);
        assert_eq!(json["snapshot"]["players"], 6);
        assert_eq!(json["snapshot"]["stale"], false);
    }
}
