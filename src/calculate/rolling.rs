//! Rolling (trailing-window) difficulty.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    Derived, Fixture, RollingComparison, RollingDifficultySeries, RollingPoint, SkipReport,
    Snapshot, TeamId,
};

use super::difficulty::DifficultyCalculator;
use super::{mean, CalcError};

pub const MIN_WINDOW: usize = 1;
pub const MAX_WINDOW: usize = 10;

pub fn validate_window(window: usize) -> Result<(), CalcError> {
    if (MIN_WINDOW..=MAX_WINDOW).contains(&window) {
        Ok(())
    } else {
        Err(CalcError::InvalidWindow(window))
    }
}

/// Trailing mean over `window` entries.
///
/// Entry `i` averages `values[max(0, i - window + 1)..=i]`, so the window
/// shrinks at the start instead of leaving gaps. The output has the same
/// length as the input. A zero window is treated as 1.
pub fn rolling_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean(&values[start..=i]).unwrap_or_default()
        })
        .collect()
}

/// Which fixtures feed a rolling series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureFilter {
    /// First gameweek to include
    pub from_gameweek: Option<u32>,

    /// Last gameweek to include
    pub to_gameweek: Option<u32>,

    /// Drop fixtures that have already been played
    pub upcoming_only: bool,
}

impl FixtureFilter {
    /// Unscheduled fixtures pass the gameweek bounds; the caller decides what
    /// to do with them.
    pub fn matches(&self, fixture: &Fixture) -> bool {
        if self.upcoming_only && fixture.finished {
            return false;
        }
        match fixture.gameweek {
            Some(gw) => {
                self.from_gameweek.map_or(true, |from| gw >= from)
                    && self.to_gameweek.map_or(true, |to| gw <= to)
            }
            None => true,
        }
    }
}

/// Rolling difficulty for each of `team_ids`, side by side.
///
/// Each series follows the team's fixtures in ascending gameweek order; both
/// fixtures of a double gameweek are kept, in fixture id order. Unknown team
/// ids and unscheduled fixtures are skipped and counted.
pub fn rolling(
    snapshot: &Snapshot,
    team_ids: &[TeamId],
    window: usize,
    filter: &FixtureFilter,
) -> Result<Derived<RollingComparison>, CalcError> {
    validate_window(window)?;
    let calc = DifficultyCalculator::new(snapshot)?;

    let mut skipped = SkipReport::default();
    let mut series = BTreeMap::new();
    let mut gameweeks = BTreeSet::new();

    let requested: BTreeSet<TeamId> = team_ids.iter().copied().collect();
    for team_id in requested {
        let Some(team) = snapshot.team(team_id) else {
            skipped.unknown_team += 1;
            continue;
        };

        let mut legs = Vec::new();
        for fixture in snapshot.fixtures_for(team_id).filter(|f| filter.matches(f)) {
            let Some(gameweek) = fixture.gameweek else {
                skipped.unscheduled += 1;
                continue;
            };
            let Some(venue) = fixture.venue_of(team_id) else {
                continue;
            };
            match calc.leg(fixture, venue) {
                Some(score) => legs.push((gameweek, score)),
                None => skipped.unknown_team += 1,
            }
        }
        legs.sort_by_key(|(gameweek, score)| (*gameweek, score.fixture_id));

        let raw: Vec<f64> = legs.iter().map(|(_, s)| s.score).collect();
        let averages = rolling_average(&raw, window);

        let points = legs
            .into_iter()
            .zip(averages)
            .map(|((gameweek, score), average)| {
                gameweeks.insert(gameweek);
                RollingPoint {
                    gameweek,
                    fixture_id: score.fixture_id,
                    opponent_id: score.opponent_id,
                    venue: score.venue,
                    raw: score.score,
                    average,
                }
            })
            .collect();

        series.insert(
            team_id,
            RollingDifficultySeries {
                team_id,
                team_name: team.name.clone(),
                points,
            },
        );
    }

    let gameweeks: Vec<u32> = gameweeks.into_iter().collect();
    let aligned = series
        .iter()
        .map(|(id, s)| (*id, s.aligned(&gameweeks)))
        .collect();

    Ok(Derived::new(
        RollingComparison {
            window,
            gameweeks,
            series,
            aligned,
        },
        skipped,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_window_of_three() {
        let out = rolling_average(&[4.0, 6.0, 8.0, 2.0], 3);
        assert_close(&out, &[4.0, 5.0, 6.0, 5.33]);
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let raw = [3.5, 0.0, 10.0, 7.25];
        assert_eq!(rolling_average(&raw, 1), raw.to_vec());
    }

    #[test]
    fn test_window_longer_than_series() {
        let out = rolling_average(&[2.0, 4.0], 10);
        assert_close(&out, &[2.0, 3.0]);
        assert!(rolling_average(&[], 5).is_empty());
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window(1).is_ok());
        assert!(validate_window(10).is_ok());
        assert_eq!(validate_window(0), Err(CalcError::InvalidWindow(0)));
        assert_eq!(validate_window(11), Err(CalcError::InvalidWindow(11)));
    }

    #[test]
    fn test_rolling_rejects_bad_window() {
        let snap = sample::league(&[(1, 1000.0), (2, 1400.0)]);
        let err = rolling(&snap, &[TeamId::new(1)], 0, &FixtureFilter::default()).unwrap_err();
        assert_eq!(err, CalcError::InvalidWindow(0));
    }

    #[test]
    fn test_rolling_multiple_teams_share_domain() {
        let snap = sample::league(&[(1, 1000.0), (2, 1200.0), (3, 1400.0)]);
        let ids = [TeamId::new(1), TeamId::new(3)];

        let out = rolling(&snap, &ids, 2, &FixtureFilter::default()).unwrap();
        let comparison = out.value;

        assert_eq!(comparison.series.len(), 2);
        assert_eq!(comparison.window, 2);
        // Team 1 plays GW 1, 2, 3, 5 and team 3 plays GW 2, 4, 5, 6
        assert_eq!(comparison.gameweeks, vec![1, 2, 3, 4, 5, 6]);

        for series in comparison.series.values() {
            let gws: Vec<u32> = series.points.iter().map(|p| p.gameweek).collect();
            let mut sorted = gws.clone();
            sorted.sort();
            assert_eq!(gws, sorted);
            assert_eq!(comparison.aligned[&series.team_id].len(), 6);
        }
        assert_eq!(out.skipped, SkipReport::default());
    }

    #[test]
    fn test_rolling_values_follow_raw_scores() {
        let snap = sample::league(&[(1, 1000.0), (2, 1400.0)]);
        let out = rolling(&snap, &[TeamId::new(1)], 2, &FixtureFilter::default()).unwrap();
        let series = &out.value.series[&TeamId::new(1)];

        // GW1 home v team 2 away (max), GW2 away v team 2 home (max)
        let raw: Vec<f64> = series.points.iter().map(|p| p.raw).collect();
        assert_eq!(raw, vec![10.0, 10.0]);
        let averages: Vec<f64> = series.points.iter().map(|p| p.average).collect();
        assert_eq!(averages, vec![10.0, 10.0]);
        assert_eq!(series.team_name, "Team 1");
    }

    #[test]
    fn test_rolling_skips_unknown_teams_and_unscheduled() {
        let mut snap = sample::league(&[(1, 1000.0), (2, 1400.0)]);
        snap.fixtures.push(sample::fixture(50, None, 1, 2));
        snap.fixtures.push(sample::fixture(51, Some(9), 1, 77));

        let ids = [TeamId::new(1), TeamId::new(99)];
        let out = rolling(&snap, &ids, 3, &FixtureFilter::default()).unwrap();

        assert_eq!(out.skipped.unknown_team, 2);
        assert_eq!(out.skipped.unscheduled, 1);
        assert_eq!(out.value.series.len(), 1);
        assert_eq!(out.value.series[&TeamId::new(1)].points.len(), 2);
    }

    #[test]
    fn test_double_gameweek_keeps_both_fixtures() {
        let teams = vec![sample::team(1, 1000.0), sample::team(2, 1200.0), sample::team(3, 1400.0)];
        let fixtures = vec![
            sample::fixture(7, Some(2), 1, 3),
            sample::fixture(4, Some(2), 2, 1),
            sample::fixture(1, Some(1), 1, 2),
        ];
        let snap = Snapshot::new(teams, fixtures, vec![], Utc::now());

        let out = rolling(&snap, &[TeamId::new(1)], 10, &FixtureFilter::default()).unwrap();
        let points = &out.value.series[&TeamId::new(1)].points;
        let order: Vec<(u32, u32)> = points.iter().map(|p| (p.gameweek, p.fixture_id.get())).collect();

        assert_eq!(order, vec![(1, 1), (2, 4), (2, 7)]);
        assert_eq!(out.value.gameweeks, vec![1, 2]);
    }

    #[test]
    fn test_filter_range_and_upcoming() {
        let mut snap = sample::league(&[(1, 1000.0), (2, 1200.0), (3, 1400.0)]);
        snap.fixtures[0].finished = true;

        let filter = FixtureFilter {
            from_gameweek: Some(1),
            to_gameweek: Some(4),
            upcoming_only: true,
        };
        let out = rolling(&snap, &[TeamId::new(1)], 5, &filter).unwrap();
        let gws: Vec<u32> = out.value.series[&TeamId::new(1)]
            .points
            .iter()
            .map(|p| p.gameweek)
            .collect();

        assert_eq!(gws, vec![2, 3]);
    }

    #[test]
    fn test_rolling_unavailable_on_empty_snapshot() {
        let snap = Snapshot::new(vec![], vec![], vec![], Utc::now());
        let err = rolling(&snap, &[TeamId::new(1)], 3, &FixtureFilter::default()).unwrap_err();
        assert_eq!(err, CalcError::Unavailable);
    }

    proptest! {
        #[test]
        fn prop_window_values_bounded_by_window_extremes(
            values in prop::collection::vec(0.0f64..10.0, 1..40),
            window in 1usize..=10,
        ) {
            let out = rolling_average(&values, window);
            prop_assert_eq!(out.len(), values.len());
            for (i, avg) in out.iter().enumerate() {
                let start = (i + 1).saturating_sub(window);
                let slice = &values[start..=i];
                let lo = slice.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(*avg >= lo - 1e-9 && *avg <= hi + 1e-9);
            }
        }

        #[test]
        fn prop_window_one_matches_input(values in prop::collection::vec(0.0f64..10.0, 0..40)) {
            prop_assert_eq!(rolling_average(&values, 1), values);
        }
    }
}
