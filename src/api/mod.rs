//! REST API endpoints.
//!
//! Axum-based HTTP API over the current snapshot: fixture difficulty,
//! rolling difficulty, team summaries and the player table. Tabular
//! endpoints also render CSV with `?format=csv`.

pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::calculate::CalcError;
use crate::export::{ExportError, Table};
use crate::models::{SkipReport, Snapshot};

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CalcError> for ApiError {
    fn from(e: CalcError) -> Self {
        match e {
            CalcError::Unavailable => ApiError::Unavailable(e.to_string()),
            CalcError::UnknownFixture(_) | CalcError::UnknownTeam(_) => {
                ApiError::NotFound(e.to_string())
            }
            CalcError::InvalidWindow(_) | CalcError::NotInFixture { .. } => {
                ApiError::BadRequest(e.to_string())
            }
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Pagination parameters.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(50).clamp(1, 100),
        }
    }

    /// Items before this page, saturating for pages far past the end.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    /// The slice of `items` this page covers.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect()
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u32) -> Self {
        let total_pages = total_items.div_ceil(pagination.page_size);
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Response encoding selected with `?format=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Csv,
}

/// JSON envelope for derived results.
#[derive(Debug, Serialize)]
pub struct DerivedResponse<T: Serialize> {
    pub data: T,
    pub skipped: SkipReport,
}

/// Render `table` as a CSV download.
pub fn csv_response(table: &Table, filename: &str) -> Result<Response, ApiError> {
    let body = table.to_csv()?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// The current snapshot, or 503 if none has ever loaded.
pub async fn current_snapshot(state: &AppState) -> Result<Arc<Snapshot>, ApiError> {
    state
        .store
        .current()
        .await
        .ok_or_else(|| ApiError::Unavailable(CalcError::Unavailable.to_string()))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin '{}', allowing any", origin);
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.server.cors_origin);
    let static_dir = state.server.static_dir.clone();

    let router = Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/players", get(routes::players::list_players))
        .route("/api/teams", get(routes::teams::list_teams))
        .route("/api/teams/summary", get(routes::teams::team_summary))
        .route(
            "/api/fixtures/difficulty",
            get(routes::fixtures::all_difficulty),
        )
        .route(
            "/api/fixtures/rolling",
            get(routes::fixtures::rolling_difficulty),
        )
        .route("/api/fixtures/compare", get(routes::fixtures::compare))
        .route(
            "/api/fixtures/:fixture_id/difficulty",
            get(routes::fixtures::fixture_difficulty),
        )
        .route("/api/refresh", post(routes::refresh::refresh))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}
