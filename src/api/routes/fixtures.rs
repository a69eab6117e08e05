use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::{parse_list, parse_opt};
use crate::api::state::AppState;
use crate::api::{csv_response, current_snapshot, ApiError, DerivedResponse, Format};
use crate::calculate::{self, DifficultyCalculator, FixtureFilter, StrengthRange};
use crate::export::Tabular;
use crate::models::{DifficultyScore, FixtureId, SkipReport, TeamId, Venue};

#[derive(Debug, Deserialize)]
pub struct DifficultyParams {
    pub team: Option<String>,
    #[serde(default)]
    pub format: Format,
}

#[derive(Debug, Serialize)]
pub struct DifficultyResponse {
    pub range: StrengthRange,
    pub scores: Vec<DifficultyScore>,
    pub skipped: SkipReport,
}

/// Both legs of every fixture, or every leg one team plays.
pub async fn all_difficulty(
    State(state): State<AppState>,
    Query(params): Query<DifficultyParams>,
) -> Result<Response, ApiError> {
    let team: Option<TeamId> = parse_opt("team", params.team.as_deref())?;
    let snapshot = current_snapshot(&state).await?;
    let calc = DifficultyCalculator::new(&snapshot)?;

    let derived = match team {
        Some(id) => {
            if snapshot.team(id).is_none() {
                return Err(calculate::CalcError::UnknownTeam(id).into());
            }
            calc.score_team(id)
        }
        None => calc.score_all(),
    };

    if params.format == Format::Csv {
        return csv_response(&derived.value.to_table(), "difficulty.csv");
    }

    Ok(Json(DifficultyResponse {
        range: calc.range(),
        scores: derived.value,
        skipped: derived.skipped,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct FixtureDifficultyParams {
    pub team: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FixtureDifficultyResponse {
    pub fixture_id: FixtureId,
    pub gameweek: Option<u32>,
    pub team_id: TeamId,
    pub opponent_id: TeamId,
    pub venue: Venue,
    pub difficulty: f64,
    pub fpl_difficulty: Option<u8>,
}

/// Difficulty of one fixture for one team. The venue is inferred from the
/// fixture when not given.
pub async fn fixture_difficulty(
    State(state): State<AppState>,
    Path(fixture_id): Path<u32>,
    Query(params): Query<FixtureDifficultyParams>,
) -> Result<Json<FixtureDifficultyResponse>, ApiError> {
    let fixture_id = FixtureId::new(fixture_id);
    let team: TeamId = parse_opt("team", params.team.as_deref())?
        .ok_or_else(|| ApiError::BadRequest("team is required".to_string()))?;
    let venue: Option<Venue> = parse_opt("venue", params.venue.as_deref())?;

    let snapshot = current_snapshot(&state).await?;
    let calc = DifficultyCalculator::new(&snapshot)?;
    let fixture = snapshot
        .fixture(fixture_id)
        .ok_or(calculate::CalcError::UnknownFixture(fixture_id))?;

    let venue = match venue.or_else(|| fixture.venue_of(team)) {
        Some(v) => v,
        None => {
            return Err(ApiError::BadRequest(format!(
                "Team {} does not play in fixture {}",
                team, fixture_id
            )))
        }
    };

    let difficulty = calc.score(team, fixture_id, venue)?;
    Ok(Json(FixtureDifficultyResponse {
        fixture_id,
        gameweek: fixture.gameweek,
        team_id: team,
        opponent_id: fixture.team_at(venue.opposite()),
        venue,
        difficulty,
        fpl_difficulty: fixture.fpl_difficulty(venue),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RollingParams {
    pub teams: Option<String>,
    pub window: Option<usize>,
    pub from: Option<u32>,
    pub to: Option<u32>,
    #[serde(default)]
    pub upcoming_only: bool,
    #[serde(default)]
    pub format: Format,
}

pub async fn rolling_difficulty(
    State(state): State<AppState>,
    Query(params): Query<RollingParams>,
) -> Result<Response, ApiError> {
    let teams: Vec<TeamId> = parse_list("teams", params.teams.as_deref())?;
    if teams.is_empty() {
        return Err(ApiError::BadRequest("teams is required".to_string()));
    }
    let window = params.window.unwrap_or(state.analysis.default_window);
    let filter = FixtureFilter {
        from_gameweek: params.from,
        to_gameweek: params.to,
        upcoming_only: params.upcoming_only,
    };

    let snapshot = current_snapshot(&state).await?;
    let derived = calculate::rolling(&snapshot, &teams, window, &filter)?;

    if params.format == Format::Csv {
        return csv_response(&derived.value.to_table(), "rolling_difficulty.csv");
    }

    Ok(Json(DerivedResponse {
        data: derived.value,
        skipped: derived.skipped,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub teams: Option<String>,
    pub gameweeks: Option<u32>,
    #[serde(default)]
    pub format: Format,
}

/// Upcoming fixtures side by side for several teams.
pub async fn compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Response, ApiError> {
    let teams: Vec<TeamId> = parse_list("teams", params.teams.as_deref())?;
    if teams.is_empty() {
        return Err(ApiError::BadRequest("teams is required".to_string()));
    }
    let gameweeks = params.gameweeks.unwrap_or(state.analysis.default_gameweeks);

    let snapshot = current_snapshot(&state).await?;
    let derived = calculate::compare_fixtures(&snapshot, &teams, gameweeks)?;

    if params.format == Format::Csv {
        return csv_response(&derived.value.to_table(), "fixture_comparison.csv");
    }

    Ok(Json(DerivedResponse {
        data: derived.value,
        skipped: derived.skipped,
    })
    .into_response())
}
