use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::parse_opt;
use crate::api::state::AppState;
use crate::api::{csv_response, current_snapshot, ApiError, DerivedResponse, Format};
use crate::calculate::{self, SummaryOptions, SummaryScope};
use crate::export::Tabular;
use crate::models::{PlayerMetric, Team, TeamId, TeamSummary, Venue};

#[derive(Debug, Deserialize)]
pub struct TeamListParams {
    #[serde(default)]
    pub format: Format,
}

#[derive(Debug, Serialize)]
pub struct TeamEntry {
    #[serde(flatten)]
    pub team: Team,
    pub blended_home: f64,
    pub blended_away: f64,
}

pub async fn list_teams(
    State(state): State<AppState>,
    Query(params): Query<TeamListParams>,
) -> Result<Response, ApiError> {
    let snapshot = current_snapshot(&state).await?;
    calculate::require(Some(snapshot.as_ref()))?;

    if params.format == Format::Csv {
        return csv_response(&snapshot.to_table(), "teams.csv");
    }

    let teams: Vec<TeamEntry> = snapshot
        .teams
        .iter()
        .map(|t| TeamEntry {
            team: t.clone(),
            blended_home: t.blended_strength(Venue::Home),
            blended_away: t.blended_strength(Venue::Away),
        })
        .collect();
    Ok(Json(teams).into_response())
}

#[derive(Debug, Deserialize)]
pub struct TeamSummaryParams {
    pub team: Option<String>,
    pub top_n: Option<usize>,
    pub rank_by: Option<String>,
    #[serde(default)]
    pub format: Format,
}

pub async fn team_summary(
    State(state): State<AppState>,
    Query(params): Query<TeamSummaryParams>,
) -> Result<Response, ApiError> {
    let team: Option<TeamId> = parse_opt("team", params.team.as_deref())?;
    let rank_by: Option<PlayerMetric> = parse_opt("rank_by", params.rank_by.as_deref())?;
    let options = SummaryOptions {
        top_n: params.top_n.unwrap_or(state.analysis.default_top_n),
        rank_by: rank_by.unwrap_or(state.analysis.default_rank_by),
    };

    let snapshot = current_snapshot(&state).await?;
    let derived = calculate::summarize(&snapshot, SummaryScope::from(team), &options)?;
    let summaries: Vec<TeamSummary> = derived.value.into_values().collect();

    if params.format == Format::Csv {
        return csv_response(&summaries.to_table(), "team_summary.csv");
    }

    Ok(Json(DerivedResponse {
        data: summaries,
        skipped: derived.skipped,
    })
    .into_response())
}
