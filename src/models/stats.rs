//! Derived statistics models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FixtureId, PlayerId, PlayerMetric, Position, TeamId, Venue};

/// Records left out of a derivation because the upstream data was
/// inconsistent or incomplete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReport {
    /// Fixtures or players pointing at a team id that isn't loaded
    pub unknown_team: u32,

    /// Fixtures without a gameweek
    pub unscheduled: u32,
}

impl SkipReport {
    pub fn total(&self) -> u32 {
        self.unknown_team + self.unscheduled
    }

    pub fn merge(&mut self, other: SkipReport) {
        self.unknown_team += other.unknown_team;
        self.unscheduled += other.unscheduled;
    }
}

/// A derived value together with what had to be skipped to produce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Derived<T> {
    pub value: T,
    pub skipped: SkipReport,
}

impl<T> Derived<T> {
    pub fn new(value: T, skipped: SkipReport) -> Self {
        Self { value, skipped }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Derived<U> {
        Derived {
            value: f(self.value),
            skipped: self.skipped,
        }
    }
}

/// Difficulty of one fixture leg for one team, 0 (easiest) to 10 (hardest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyScore {
    pub team_id: TeamId,
    pub opponent_id: TeamId,
    pub fixture_id: FixtureId,
    pub gameweek: Option<u32>,
    pub venue: Venue,
    pub score: f64,
}

/// One entry of a rolling difficulty series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub gameweek: u32,
    pub fixture_id: FixtureId,
    pub opponent_id: TeamId,
    pub venue: Venue,
    /// Difficulty of this fixture alone
    pub raw: f64,
    /// Trailing mean up to and including this fixture
    pub average: f64,
}

/// Rolling average difficulty for one team, in ascending gameweek order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingDifficultySeries {
    pub team_id: TeamId,
    pub team_name: String,
    pub points: Vec<RollingPoint>,
}

impl RollingDifficultySeries {
    /// Rolling value at each gameweek of `domain`, taking the later fixture of
    /// a double gameweek; `None` where the team has no fixture.
    pub fn aligned(&self, domain: &[u32]) -> Vec<Option<f64>> {
        domain
            .iter()
            .map(|gw| {
                self.points
                    .iter()
                    .rev()
                    .find(|p| p.gameweek == *gw)
                    .map(|p| p.average)
            })
            .collect()
    }
}

/// Rolling series for several teams over a shared gameweek domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollingComparison {
    pub window: usize,
    /// Every gameweek present in any series, ascending
    pub gameweeks: Vec<u32>,
    pub series: BTreeMap<TeamId, RollingDifficultySeries>,
    /// Each series' rolling value at every entry of `gameweeks`
    pub aligned: BTreeMap<TeamId, Vec<Option<f64>>>,
}

/// A player picked into a team summary's top-N.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPlayer {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Option<Position>,
    pub value: f64,
}

/// Player count and mean points for one position within a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBreakdown {
    pub position: Position,
    pub player_count: u32,
    pub avg_points: Option<f64>,
}

/// Aggregated player statistics for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_id: TeamId,
    pub team_name: String,
    pub player_count: u32,

    /// Sum per metric; missing values contribute nothing
    pub sums: BTreeMap<PlayerMetric, f64>,

    /// Mean per metric over players that report it; absent when none do
    pub means: BTreeMap<PlayerMetric, f64>,

    /// Number of players reporting each metric
    pub counts: BTreeMap<PlayerMetric, u32>,

    pub rank_by: PlayerMetric,
    pub top_n: Vec<TopPlayer>,
    pub positions: Vec<PositionBreakdown>,
}

/// One row of the multi-team fixture comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub gameweek: u32,
    pub opponent: String,
    pub venue: Venue,
    pub fpl_difficulty: Option<u8>,
    pub difficulty: f64,
    pub kickoff_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Per-team difficulty summary over the comparison horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub team_id: TeamId,
    pub team_name: String,
    pub avg_difficulty: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    pub fixtures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureComparison {
    pub max_gameweek: u32,
    pub rows: Vec<ComparisonRow>,
    pub summary: Vec<ComparisonSummary>,
}
