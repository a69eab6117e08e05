//! Per-team player aggregation.

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Derived, Player, PlayerMetric, Position, PositionBreakdown, SkipReport, Snapshot, Team,
    TeamId, TeamSummary, TopPlayer,
};

use super::{mean, CalcError};

/// Which teams to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryScope {
    All,
    Team(TeamId),
}

impl From<Option<TeamId>> for SummaryScope {
    fn from(team: Option<TeamId>) -> Self {
        team.map_or(SummaryScope::All, SummaryScope::Team)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Size of the top-N list
    pub top_n: usize,

    /// Metric the top-N list is ranked by
    pub rank_by: PlayerMetric,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            rank_by: PlayerMetric::TotalPoints,
        }
    }
}

/// Summaries keyed by team id, one per team in scope.
///
/// Teams without players still get a row (zero sums, no means, empty top-N).
/// Players whose team id isn't loaded are skipped and counted.
pub fn summarize(
    snapshot: &Snapshot,
    scope: SummaryScope,
    options: &SummaryOptions,
) -> Result<Derived<BTreeMap<TeamId, TeamSummary>>, CalcError> {
    if snapshot.is_empty() {
        return Err(CalcError::Unavailable);
    }

    let teams: Vec<&Team> = match scope {
        SummaryScope::All => snapshot.teams.iter().collect(),
        SummaryScope::Team(id) => vec![snapshot.team(id).ok_or(CalcError::UnknownTeam(id))?],
    };

    let mut skipped = SkipReport::default();
    let mut by_team: HashMap<TeamId, Vec<&Player>> = HashMap::new();
    for player in &snapshot.players {
        if snapshot.team(player.team).is_none() {
            skipped.unknown_team += 1;
            continue;
        }
        by_team.entry(player.team).or_default().push(player);
    }

    let summaries = teams
        .into_iter()
        .map(|team| {
            let players = by_team.get(&team.id).map(Vec::as_slice).unwrap_or(&[]);
            (team.id, summarize_team(team, players, options))
        })
        .collect();

    Ok(Derived::new(summaries, skipped))
}

fn summarize_team(team: &Team, players: &[&Player], options: &SummaryOptions) -> TeamSummary {
    let mut sums: BTreeMap<PlayerMetric, f64> = BTreeMap::new();
    let mut means: BTreeMap<PlayerMetric, f64> = BTreeMap::new();
    let mut counts: BTreeMap<PlayerMetric, u32> = BTreeMap::new();

    for metric in PlayerMetric::ALL {
        let values: Vec<f64> = players.iter().filter_map(|p| p.metric(metric)).collect();
        sums.insert(metric, values.iter().sum());
        counts.insert(metric, values.len() as u32);
        if let Some(m) = mean(&values) {
            means.insert(metric, m);
        }
    }

    TeamSummary {
        team_id: team.id,
        team_name: team.name.clone(),
        player_count: players.len() as u32,
        sums,
        means,
        counts,
        rank_by: options.rank_by,
        top_n: top_players(players, options.rank_by, options.top_n),
        positions: position_breakdown(players),
    }
}

/// Highest `n` players by `metric`; ties go to the lower player id.
pub fn top_players(players: &[&Player], metric: PlayerMetric, n: usize) -> Vec<TopPlayer> {
    let mut ranked: Vec<(&Player, f64)> = players
        .iter()
        .filter_map(|p| p.metric(metric).map(|v| (*p, v)))
        .collect();
    ranked.sort_by(|(pa, va), (pb, vb)| vb.total_cmp(va).then(pa.id.cmp(&pb.id)));

    ranked
        .into_iter()
        .take(n)
        .map(|(p, value)| TopPlayer {
            player_id: p.id,
            name: p.display_name().to_string(),
            position: p.position(),
            value,
        })
        .collect()
}

fn position_breakdown(players: &[&Player]) -> Vec<PositionBreakdown> {
    let has_managers = players.iter().any(|p| p.position() == Some(Position::Manager));
    let positions = Position::PLAYING
        .into_iter()
        .chain(has_managers.then_some(Position::Manager));

    positions
        .map(|position| {
            let in_position: Vec<&&Player> = players
                .iter()
                .filter(|p| p.position() == Some(position))
                .collect();
            let points: Vec<f64> = in_position.iter().filter_map(|p| p.total_points).collect();
            PositionBreakdown {
                position,
                player_count: in_position.len() as u32,
                avg_points: mean(&points),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample, PlayerId};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn snapshot_with(players: Vec<Player>) -> Snapshot {
        let teams = vec![sample::team(1, 1100.0), sample::team(2, 1200.0)];
        Snapshot::new(teams, vec![], players, Utc::now())
    }

    #[test]
    fn test_sums_and_means() {
        let snap = snapshot_with(vec![
            sample::player(1, 1, Some(100.0), Some(80.0)),
            sample::player(2, 1, Some(50.0), Some(60.0)),
        ]);
        let out = summarize(&snap, SummaryScope::All, &SummaryOptions::default()).unwrap();
        let team1 = &out.value[&TeamId::new(1)];

        assert_eq!(team1.player_count, 2);
        assert_eq!(team1.sums[&PlayerMetric::TotalPoints], 150.0);
        assert_eq!(team1.means[&PlayerMetric::TotalPoints], 75.0);
        assert_eq!(team1.means[&PlayerMetric::Price], 7.0);
        // Nobody reports goals: summed as zero, no mean
        assert_eq!(team1.sums[&PlayerMetric::GoalsScored], 0.0);
        assert_eq!(team1.counts[&PlayerMetric::GoalsScored], 0);
        assert!(!team1.means.contains_key(&PlayerMetric::GoalsScored));
    }

    #[test]
    fn test_team_without_players_still_has_row() {
        let snap = snapshot_with(vec![sample::player(1, 1, Some(10.0), Some(45.0))]);
        let out = summarize(&snap, SummaryScope::All, &SummaryOptions::default()).unwrap();

        assert_eq!(out.value.len(), 2);
        let team2 = &out.value[&TeamId::new(2)];
        assert_eq!(team2.player_count, 0);
        assert!(team2.sums.values().all(|v| *v == 0.0));
        assert!(team2.means.is_empty());
        assert!(team2.top_n.is_empty());
    }

    #[test]
    fn test_missing_points_excluded_not_zeroing() {
        let snap = snapshot_with(vec![
            sample::player(1, 1, Some(120.0), Some(100.0)),
            sample::player(2, 1, None, Some(50.0)),
            sample::player(3, 1, Some(30.0), Some(45.0)),
        ]);
        let out = summarize(&snap, SummaryScope::Team(TeamId::new(1)), &SummaryOptions::default())
            .unwrap();
        let team1 = &out.value[&TeamId::new(1)];

        assert_eq!(team1.sums[&PlayerMetric::TotalPoints], 150.0);
        assert_eq!(team1.counts[&PlayerMetric::TotalPoints], 2);
        assert_eq!(team1.means[&PlayerMetric::TotalPoints], 75.0);
        assert_eq!(team1.counts[&PlayerMetric::Price], 3);
        // The player without points can't be ranked by points.
        let ranked: Vec<PlayerId> = team1.top_n.iter().map(|t| t.player_id).collect();
        assert_eq!(ranked, vec![PlayerId::new(1), PlayerId::new(3)]);
    }

    #[test]
    fn test_top_n_ranking_and_ties() {
        let snap = snapshot_with(vec![
            sample::player(4, 2, Some(60.0), Some(50.0)),
            sample::player(2, 2, Some(90.0), Some(50.0)),
            sample::player(3, 2, Some(60.0), Some(50.0)),
            sample::player(1, 2, Some(10.0), Some(50.0)),
        ]);
        let options = SummaryOptions {
            top_n: 3,
            rank_by: PlayerMetric::TotalPoints,
        };
        let out = summarize(&snap, SummaryScope::Team(TeamId::new(2)), &options).unwrap();
        let top = &out.value[&TeamId::new(2)].top_n;

        let ids: Vec<u32> = top.iter().map(|t| t.player_id.get()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(top[0].value, 90.0);
        assert_eq!(top[0].name, "Player 2");
    }

    #[test]
    fn test_rank_by_other_metric() {
        let snap = snapshot_with(vec![
            sample::player(1, 1, Some(100.0), Some(130.0)),
            sample::player(2, 1, Some(80.0), Some(40.0)),
        ]);
        let options = SummaryOptions {
            top_n: 1,
            rank_by: PlayerMetric::ValueScore,
        };
        let out = summarize(&snap, SummaryScope::All, &options).unwrap();
        let top = &out.value[&TeamId::new(1)].top_n;

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].player_id, PlayerId::new(2));
        assert_eq!(top[0].value, 20.0);
    }

    #[test]
    fn test_unknown_team_players_skipped() {
        let snap = snapshot_with(vec![
            sample::player(1, 1, Some(10.0), Some(45.0)),
            sample::player(2, 77, Some(99.0), Some(45.0)),
        ]);
        let out = summarize(&snap, SummaryScope::All, &SummaryOptions::default()).unwrap();

        assert_eq!(out.skipped.unknown_team, 1);
        assert_eq!(out.value[&TeamId::new(1)].sums[&PlayerMetric::TotalPoints], 10.0);
        assert!(!out.value.contains_key(&TeamId::new(77)));
    }

    #[test]
    fn test_position_breakdown() {
        let mut keeper = sample::player(1, 1, Some(40.0), Some(45.0));
        keeper.element_type = 1;
        let mut striker = sample::player(2, 1, Some(90.0), Some(75.0));
        striker.element_type = 4;
        let mut striker2 = sample::player(3, 1, Some(30.0), Some(55.0));
        striker2.element_type = 4;
        let snap = snapshot_with(vec![keeper, striker, striker2]);

        let out = summarize(&snap, SummaryScope::All, &SummaryOptions::default()).unwrap();
        let positions = &out.value[&TeamId::new(1)].positions;

        assert_eq!(positions.len(), 4);
        assert_eq!(positions[0].position, Position::Goalkeeper);
        assert_eq!(positions[0].player_count, 1);
        assert_eq!(positions[1].avg_points, None);
        assert_eq!(positions[3].position, Position::Forward);
        assert_eq!(positions[3].avg_points, Some(60.0));
    }

    #[test]
    fn test_unknown_scope_team() {
        let snap = snapshot_with(vec![]);
        let err = summarize(&snap, SummaryScope::Team(TeamId::new(9)), &SummaryOptions::default())
            .unwrap_err();
        assert_eq!(err, CalcError::UnknownTeam(TeamId::new(9)));
    }

    #[test]
    fn test_unavailable_when_empty() {
        let snap = Snapshot::new(vec![], vec![], vec![], Utc::now());
        let err = summarize(&snap, SummaryScope::All, &SummaryOptions::default()).unwrap_err();
        assert_eq!(err, CalcError::Unavailable);
    }

    #[test]
    fn test_scope_from_option() {
        assert_eq!(SummaryScope::from(None), SummaryScope::All);
        assert_eq!(
            SummaryScope::from(Some(TeamId::new(3))),
            SummaryScope::Team(TeamId::new(3))
        );
    }
}
