//! Fixture model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FixtureId, TeamId, Venue};

/// A fixture as published by `/api/fixtures/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,

    /// Gameweek number; `None` while the fixture is unscheduled
    #[serde(rename = "event")]
    pub gameweek: Option<u32>,

    pub team_h: TeamId,
    pub team_a: TeamId,

    #[serde(default)]
    pub finished: bool,

    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,

    /// Official 1..5 difficulty for the home side
    #[serde(default)]
    pub team_h_difficulty: Option<u8>,

    /// Official 1..5 difficulty for the away side
    #[serde(default)]
    pub team_a_difficulty: Option<u8>,

    #[serde(default)]
    pub team_h_score: Option<u32>,

    #[serde(default)]
    pub team_a_score: Option<u32>,
}

impl Fixture {
    /// Team playing at `venue`.
    pub fn team_at(&self, venue: Venue) -> TeamId {
        match venue {
            Venue::Home => self.team_h,
            Venue::Away => self.team_a,
        }
    }

    /// Venue `team` plays at, if it takes part in this fixture.
    pub fn venue_of(&self, team: TeamId) -> Option<Venue> {
        if self.team_h == team {
            Some(Venue::Home)
        } else if self.team_a == team {
            Some(Venue::Away)
        } else {
            None
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.venue_of(team).is_some()
    }

    /// Official FPL difficulty from the perspective of the side at `venue`.
    pub fn fpl_difficulty(&self, venue: Venue) -> Option<u8> {
        match venue {
            Venue::Home => self.team_h_difficulty,
            Venue::Away => self.team_a_difficulty,
        }
    }
}
