//! Filterable, sortable player table.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Derived, Player, PlayerId, PlayerMetric, Position, SkipReport, Snapshot, TeamId};

use super::CalcError;

/// Filters and ordering for the player table. Empty lists mean "any".
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerQuery {
    pub positions: Vec<Position>,
    pub teams: Vec<TeamId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_points: Option<f64>,
    /// Case-insensitive substring of the display name
    pub search: Option<String>,
    pub sort_by: PlayerMetric,
    pub descending: bool,
}

impl Default for PlayerQuery {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            teams: Vec::new(),
            min_price: None,
            max_price: None,
            min_points: None,
            search: None,
            sort_by: PlayerMetric::TotalPoints,
            descending: true,
        }
    }
}

impl PlayerQuery {
    pub fn matches(&self, player: &Player) -> bool {
        if !self.positions.is_empty()
            && !player.position().is_some_and(|p| self.positions.contains(&p))
        {
            return false;
        }
        if !self.teams.is_empty() && !self.teams.contains(&player.team) {
            return false;
        }
        if let Some(min) = self.min_price {
            if !player.price().is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if !player.price().is_some_and(|p| p <= max) {
                return false;
            }
        }
        if let Some(min) = self.min_points {
            if !player.total_points.is_some_and(|p| p >= min) {
                return false;
            }
        }
        if let Some(needle) = self.search.as_deref().map(str::to_lowercase) {
            let name = player.display_name().to_lowercase();
            let full = format!("{} {}", player.first_name, player.second_name).to_lowercase();
            if !name.contains(&needle) && !full.contains(&needle) {
                return false;
            }
        }
        true
    }
}

/// One row of the player table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub position: Option<Position>,
    pub price: Option<f64>,
    pub total_points: Option<f64>,
    pub points_per_game: Option<f64>,
    pub selected_by_percent: Option<f64>,
    pub form: Option<f64>,
    pub value_score: Option<f64>,
    pub goals_scored: Option<f64>,
    pub assists: Option<f64>,
    pub clean_sheets: Option<f64>,
    pub bonus: Option<f64>,
    pub minutes: Option<f64>,
    pub starts: Option<f64>,
    pub ict_index: Option<f64>,
    pub expected_goals: Option<f64>,
    pub expected_assists: Option<f64>,
}

impl PlayerRow {
    fn new(player: &Player, team_name: &str) -> Self {
        Self {
            player_id: player.id,
            name: player.display_name().to_string(),
            team_id: player.team,
            team_name: team_name.to_string(),
            position: player.position(),
            price: player.price(),
            total_points: player.total_points,
            points_per_game: player.points_per_game,
            selected_by_percent: player.selected_by_percent,
            form: player.form,
            value_score: player.value_score(),
            goals_scored: player.goals_scored,
            assists: player.assists,
            clean_sheets: player.clean_sheets,
            bonus: player.bonus,
            minutes: player.minutes,
            starts: player.starts,
            ict_index: player.ict_index,
            expected_goals: player.expected_goals,
            expected_assists: player.expected_assists,
        }
    }
}

/// Missing values sort last whichever way the rest is ordered.
fn compare_metric(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Players matching `query`, sorted. Players on unknown teams are skipped.
pub fn query_players(
    snapshot: &Snapshot,
    query: &PlayerQuery,
) -> Result<Derived<Vec<PlayerRow>>, CalcError> {
    if snapshot.is_empty() {
        return Err(CalcError::Unavailable);
    }

    let mut skipped = SkipReport::default();
    let mut matched: Vec<(&Player, &str)> = Vec::new();
    for player in &snapshot.players {
        let Some(team_name) = snapshot.team_name(player.team) else {
            skipped.unknown_team += 1;
            continue;
        };
        if query.matches(player) {
            matched.push((player, team_name));
        }
    }

    matched.sort_by(|(a, _), (b, _)| {
        compare_metric(a.metric(query.sort_by), b.metric(query.sort_by), query.descending)
            .then(a.id.cmp(&b.id))
    });

    let rows = matched
        .into_iter()
        .map(|(player, team_name)| PlayerRow::new(player, team_name))
        .collect();

    Ok(Derived::new(rows, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample;
    use chrono::Utc;

    fn snapshot() -> Snapshot {
        let mut gk = sample::player(1, 1, Some(120.0), Some(50.0));
        gk.element_type = 1;
        gk.web_name = "Raya".to_string();
        let mut fwd = sample::player(2, 2, Some(180.0), Some(150.0));
        fwd.element_type = 4;
        fwd.web_name = "Haaland".to_string();
        fwd.first_name = "Erling".to_string();
        let mid = sample::player(3, 2, None, Some(70.0));
        let stray = sample::player(4, 42, Some(10.0), Some(40.0));

        let teams = vec![sample::team(1, 1100.0), sample::team(2, 1200.0)];
        Snapshot::new(teams, vec![], vec![gk, fwd, mid, stray], Utc::now())
    }

    fn ids(rows: &[PlayerRow]) -> Vec<u32> {
        rows.iter().map(|r| r.player_id.get()).collect()
    }

    #[test]
    fn test_default_sorts_by_points_descending() {
        let out = query_players(&snapshot(), &PlayerQuery::default()).unwrap();

        assert_eq!(ids(&out.value), vec![2, 1, 3]);
        assert_eq!(out.skipped.unknown_team, 1);
        assert_eq!(out.value[0].team_name, "Team 2");
        assert_eq!(out.value[0].price, Some(15.0));
    }

    #[test]
    fn test_ascending_keeps_missing_last() {
        let query = PlayerQuery {
            descending: false,
            ..PlayerQuery::default()
        };
        let out = query_players(&snapshot(), &query).unwrap();
        assert_eq!(ids(&out.value), vec![1, 2, 3]);
    }

    #[test]
    fn test_filters() {
        let snap = snapshot();

        let by_position = PlayerQuery {
            positions: vec![Position::Goalkeeper],
            ..PlayerQuery::default()
        };
        assert_eq!(ids(&query_players(&snap, &by_position).unwrap().value), vec![1]);

        let by_team = PlayerQuery {
            teams: vec![TeamId::new(2)],
            ..PlayerQuery::default()
        };
        assert_eq!(ids(&query_players(&snap, &by_team).unwrap().value), vec![2, 3]);

        let by_price = PlayerQuery {
            min_price: Some(6.0),
            max_price: Some(10.0),
            ..PlayerQuery::default()
        };
        assert_eq!(ids(&query_players(&snap, &by_price).unwrap().value), vec![3]);

        let by_points = PlayerQuery {
            min_points: Some(150.0),
            ..PlayerQuery::default()
        };
        assert_eq!(ids(&query_players(&snap, &by_points).unwrap().value), vec![2]);
    }

    #[test]
    fn test_search_matches_full_name() {
        let query = PlayerQuery {
            search: Some("erling".to_string()),
            ..PlayerQuery::default()
        };
        let out = query_players(&snapshot(), &query).unwrap();
        assert_eq!(ids(&out.value), vec![2]);
    }

    #[test]
    fn test_sort_by_value_score() {
        let query = PlayerQuery {
            sort_by: PlayerMetric::ValueScore,
            ..PlayerQuery::default()
        };
        let out = query_players(&snapshot(), &query).unwrap();
        // 120 / 5.0 = 24 beats 180 / 15.0 = 12
        assert_eq!(ids(&out.value), vec![1, 2, 3]);
        assert_eq!(out.value[0].value_score, Some(24.0));
    }
}
