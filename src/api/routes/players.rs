use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::{parse_list, parse_opt};
use crate::api::state::AppState;
use crate::api::{csv_response, current_snapshot, ApiError, Format, Pagination, PaginationMeta};
use crate::calculate::{self, PlayerQuery, PlayerRow};
use crate::export::Tabular;
use crate::models::{PlayerMetric, Position, SkipReport, TeamId};

#[derive(Debug, Deserialize)]
pub struct PlayerParams {
    /// Comma-separated positions, e.g. `DEF,MID`
    pub position: Option<String>,
    /// Comma-separated team ids
    pub team: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_points: Option<f64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default)
    pub order: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    #[serde(default)]
    pub format: Format,
}

impl PlayerParams {
    fn to_query(&self) -> Result<PlayerQuery, ApiError> {
        let positions: Vec<Position> = parse_list("position", self.position.as_deref())?;
        let teams: Vec<TeamId> = parse_list("team", self.team.as_deref())?;
        let sort_by: Option<PlayerMetric> = parse_opt("sort_by", self.sort_by.as_deref())?;
        let descending = match self.order.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("desc") => true,
            Some("asc") => false,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "invalid order '{}', expected asc or desc",
                    other
                )))
            }
        };

        Ok(PlayerQuery {
            positions,
            teams,
            min_price: self.min_price,
            max_price: self.max_price,
            min_points: self.min_points,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            sort_by: sort_by.unwrap_or(PlayerMetric::TotalPoints),
            descending,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PlayerPage {
    pub players: Vec<PlayerRow>,
    pub pagination: PaginationMeta,
    pub skipped: SkipReport,
}

/// Filtered, sorted player table. CSV output is not paginated.
pub async fn list_players(
    State(state): State<AppState>,
    Query(params): Query<PlayerParams>,
) -> Result<Response, ApiError> {
    let query = params.to_query()?;
    let snapshot = current_snapshot(&state).await?;
    let derived = calculate::query_players(&snapshot, &query)?;

    if params.format == Format::Csv {
        return csv_response(&derived.value.to_table(), "players.csv");
    }

    let pagination = Pagination::new(params.page, params.page_size);
    let total = derived.value.len() as u32;
    Ok(Json(PlayerPage {
        players: pagination.apply(derived.value),
        pagination: PaginationMeta::new(&pagination, total),
        skipped: derived.skipped,
    })
    .into_response())
}
