//! Multi-team fixture comparison over the next N gameweeks.

use std::collections::BTreeSet;

use crate::models::{
    ComparisonRow, ComparisonSummary, Derived, FixtureComparison, SkipReport, Snapshot, TeamId,
};

use super::difficulty::DifficultyCalculator;
use super::CalcError;

/// Fixture table for `team_ids` up to and including `max_gameweek`, with a
/// per-team summary ordered from easiest to hardest run.
pub fn compare_fixtures(
    snapshot: &Snapshot,
    team_ids: &[TeamId],
    max_gameweek: u32,
) -> Result<Derived<FixtureComparison>, CalcError> {
    let calc = DifficultyCalculator::new(snapshot)?;
    let mut skipped = SkipReport::default();
    let mut rows = Vec::new();
    let mut summary = Vec::new();

    let requested: BTreeSet<TeamId> = team_ids.iter().copied().collect();
    for team_id in requested {
        let Some(team) = snapshot.team(team_id) else {
            skipped.unknown_team += 1;
            continue;
        };

        let mut scores = Vec::new();
        for fixture in snapshot.fixtures_for(team_id) {
            let Some(gameweek) = fixture.gameweek else {
                skipped.unscheduled += 1;
                continue;
            };
            if gameweek > max_gameweek {
                continue;
            }
            let Some(venue) = fixture.venue_of(team_id) else {
                continue;
            };
            let Some(leg) = calc.leg(fixture, venue) else {
                skipped.unknown_team += 1;
                continue;
            };

            scores.push(leg.score);
            rows.push(ComparisonRow {
                team_id,
                team_name: team.name.clone(),
                gameweek,
                opponent: snapshot
                    .team_name(leg.opponent_id)
                    .unwrap_or_default()
                    .to_string(),
                venue,
                fpl_difficulty: fixture.fpl_difficulty(venue),
                difficulty: leg.score,
                kickoff_time: fixture.kickoff_time,
            });
        }

        if scores.is_empty() {
            continue;
        }
        let total: f64 = scores.iter().sum();
        summary.push(ComparisonSummary {
            team_id,
            team_name: team.name.clone(),
            avg_difficulty: total / scores.len() as f64,
            min_difficulty: scores.iter().cloned().fold(f64::INFINITY, f64::min),
            max_difficulty: scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            fixtures: scores.len() as u32,
        });
    }

    rows.sort_by(|a, b| {
        a.gameweek
            .cmp(&b.gameweek)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    summary.sort_by(|a, b| {
        a.avg_difficulty
            .total_cmp(&b.avg_difficulty)
            .then(a.team_id.cmp(&b.team_id))
    });

    Ok(Derived::new(
        FixtureComparison {
            max_gameweek,
            rows,
            summary,
        },
        skipped,
    ))
}
