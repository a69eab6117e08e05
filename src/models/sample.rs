//! Builders for test snapshots.

use std::collections::BTreeMap;

use chrono::Utc;

use super::{Fixture, FixtureId, Player, PlayerId, Snapshot, Team, TeamId};

/// A team whose six strength ratings are all `rating`.
pub fn team(id: u32, rating: f64) -> Team {
    team_with(id, rating, rating, rating, rating)
}

pub fn team_with(
    id: u32,
    attack_home: f64,
    defence_home: f64,
    attack_away: f64,
    defence_away: f64,
) -> Team {
    Team {
        id: TeamId::new(id),
        name: format!("Team {}", id),
        short_name: format!("T{}", id),
        strength: 3,
        strength_overall_home: (attack_home + defence_home) / 2.0,
        strength_overall_away: (attack_away + defence_away) / 2.0,
        strength_attack_home: attack_home,
        strength_attack_away: attack_away,
        strength_defence_home: defence_home,
        strength_defence_away: defence_away,
    }
}

pub fn fixture(id: u32, gameweek: Option<u32>, home: u32, away: u32) -> Fixture {
    Fixture {
        id: FixtureId::new(id),
        gameweek,
        team_h: TeamId::new(home),
        team_a: TeamId::new(away),
        finished: false,
        kickoff_time: None,
        team_h_difficulty: Some(3),
        team_a_difficulty: Some(3),
        team_h_score: None,
        team_a_score: None,
    }
}

/// A player with only points and price (in tenths) populated.
pub fn player(id: u32, team: u32, points: Option<f64>, now_cost: Option<f64>) -> Player {
    Player {
        id: PlayerId::new(id),
        web_name: format!("Player {}", id),
        first_name: String::new(),
        second_name: format!("Player {}", id),
        team: TeamId::new(team),
        element_type: 3,
        now_cost,
        total_points: points,
        points_per_game: None,
        form: None,
        selected_by_percent: None,
        goals_scored: None,
        assists: None,
        clean_sheets: None,
        goals_conceded: None,
        bonus: None,
        minutes: None,
        starts: None,
        saves: None,
        yellow_cards: None,
        red_cards: None,
        ict_index: None,
        expected_goals: None,
        expected_assists: None,
        extra: BTreeMap::new(),
    }
}

/// Every team meets every other team home and away, one fixture per
/// gameweek, fixture ids counting up from 1.
pub fn league(teams: &[(u32, f64)]) -> Snapshot {
    let mut fixtures = Vec::new();
    let mut next_id = 1;
    for &(home, _) in teams {
        for &(away, _) in teams {
            if home != away {
                fixtures.push(fixture(next_id, Some(next_id), home, away));
                next_id += 1;
            }
        }
    }
    let teams = teams.iter().map(|&(id, rating)| team(id, rating)).collect();
    Snapshot::new(teams, fixtures, vec![], Utc::now())
}
