//! One fetch cycle's worth of upstream data.

use chrono::{DateTime, Utc};

use super::{Fixture, FixtureId, Player, Team, TeamId};

/// Teams, fixtures and players as of a single fetch.
///
/// A snapshot is never patched in place: a refresh builds a new one and the
/// store swaps it in whole.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub fixtures: Vec<Fixture>,
    pub players: Vec<Player>,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(
        mut teams: Vec<Team>,
        mut fixtures: Vec<Fixture>,
        players: Vec<Player>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        teams.sort_by_key(|t| t.id);
        fixtures.sort_by_key(|f| (f.gameweek.is_none(), f.gameweek, f.id));
        Self {
            teams,
            fixtures,
            players,
            fetched_at,
        }
    }

    /// A snapshot with no teams carries nothing to derive from.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|idx| &self.teams[idx])
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.id == id)
    }

    pub fn team_name(&self, id: TeamId) -> Option<&str> {
        self.team(id).map(|t| t.name.as_str())
    }

    /// Fixtures involving `team`, in gameweek order.
    pub fn fixtures_for(&self, team: TeamId) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter().filter(move |f| f.involves(team))
    }

    /// Age of the snapshot relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.fetched_at)
    }
}
