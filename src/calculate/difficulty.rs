//! Granular fixture difficulty.
//!
//! A fixture leg is scored by the strength of the opponent at the venue the
//! opponent plays at: scoring the home side uses the away team's *away*
//! attack and defence. Attack and defence are blended into one magnitude and
//! rescaled onto 0..10 using the league-wide spread of that magnitude, so the
//! scale follows the ratings as they drift between seasons.

use serde::Serialize;

use crate::models::{
    Derived, DifficultyScore, Fixture, FixtureId, SkipReport, Snapshot, Team, TeamId, Venue,
};

use super::CalcError;

/// Score used when every team has the same blended strength.
pub const MIDPOINT: f64 = 5.0;

/// Observed min/max of blended strength across the league.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrengthRange {
    pub min: f64,
    pub max: f64,
}

impl StrengthRange {
    /// Bounds over every team at both venues. `None` when there are no teams.
    pub fn from_teams(teams: &[Team]) -> Option<Self> {
        let mut magnitudes = teams
            .iter()
            .flat_map(|t| [t.blended_strength(Venue::Home), t.blended_strength(Venue::Away)]);

        let first = magnitudes.next()?;
        let (min, max) = magnitudes.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m)));
        Some(Self { min, max })
    }

    pub fn is_degenerate(&self) -> bool {
        self.max - self.min <= 0.0
    }

    /// Map a raw magnitude onto 0..10.
    pub fn rescale(&self, magnitude: f64) -> f64 {
        if self.is_degenerate() {
            return MIDPOINT;
        }
        ((magnitude - self.min) / (self.max - self.min) * 10.0).clamp(0.0, 10.0)
    }
}

/// Difficulty scorer bound to one snapshot.
pub struct DifficultyCalculator<'a> {
    snapshot: &'a Snapshot,
    range: StrengthRange,
}

impl<'a> DifficultyCalculator<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Result<Self, CalcError> {
        let range = StrengthRange::from_teams(&snapshot.teams).ok_or(CalcError::Unavailable)?;
        Ok(Self { snapshot, range })
    }

    pub fn range(&self) -> StrengthRange {
        self.range
    }

    /// Score the leg of `fixture` played at `venue`. `None` if either team is
    /// missing from the snapshot.
    pub fn leg(&self, fixture: &Fixture, venue: Venue) -> Option<DifficultyScore> {
        let team_id = fixture.team_at(venue);
        let opponent_id = fixture.team_at(venue.opposite());
        self.snapshot.team(team_id)?;
        let opponent = self.snapshot.team(opponent_id)?;

        let magnitude = opponent.blended_strength(venue.opposite());
        Some(DifficultyScore {
            team_id,
            opponent_id,
            fixture_id: fixture.id,
            gameweek: fixture.gameweek,
            venue,
            score: self.range.rescale(magnitude),
        })
    }

    /// Difficulty for `team` playing at `venue` in `fixture_id`.
    pub fn score(
        &self,
        team: TeamId,
        fixture_id: FixtureId,
        venue: Venue,
    ) -> Result<f64, CalcError> {
        let fixture = self
            .snapshot
            .fixture(fixture_id)
            .ok_or(CalcError::UnknownFixture(fixture_id))?;

        if fixture.team_at(venue) != team {
            return Err(CalcError::NotInFixture {
                team,
                fixture: fixture_id,
                venue,
            });
        }

        self.leg(fixture, venue)
            .map(|s| s.score)
            .ok_or_else(|| {
                let missing = if self.snapshot.team(team).is_none() {
                    team
                } else {
                    fixture.team_at(venue.opposite())
                };
                CalcError::UnknownTeam(missing)
            })
    }

    /// Both legs of every fixture, home leg first.
    pub fn score_all(&self) -> Derived<Vec<DifficultyScore>> {
        self.score_where(|_| true)
    }

    /// Legs of every fixture `team` plays in, from `team`'s perspective.
    pub fn score_team(&self, team: TeamId) -> Derived<Vec<DifficultyScore>> {
        let all = self.score_where(|f| f.involves(team));
        all.map(|scores| scores.into_iter().filter(|s| s.team_id == team).collect())
    }

    fn score_where(&self, keep: impl Fn(&Fixture) -> bool) -> Derived<Vec<DifficultyScore>> {
        let mut skipped = SkipReport::default();
        let mut scores = Vec::new();

        for fixture in self.snapshot.fixtures.iter().filter(|f| keep(f)) {
            match (self.leg(fixture, Venue::Home), self.leg(fixture, Venue::Away)) {
                (Some(home), Some(away)) => {
                    scores.push(home);
                    scores.push(away);
                }
                _ => skipped.unknown_team += 1,
            }
        }

        Derived::new(scores, skipped)
    }
}

/// Difficulty for one fixture leg in `snapshot`.
pub fn score(
    snapshot: &Snapshot,
    team: TeamId,
    fixture: FixtureId,
    venue: Venue,
) -> Result<f64, CalcError> {
    DifficultyCalculator::new(snapshot)?.score(team, fixture, venue)
}

/// Every fixture leg in `snapshot`.
pub fn score_all(snapshot: &Snapshot) -> Result<Derived<Vec<DifficultyScore>>, CalcError> {
    Ok(DifficultyCalculator::new(snapshot)?.score_all())
}
