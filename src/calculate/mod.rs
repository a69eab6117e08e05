//! Statistics calculation engine.
//!
//! Computes derived metrics from one snapshot of upstream data:
//! - Granular fixture difficulty (0..10) from team strength ratings
//! - Rolling average difficulty per team
//! - Per-team player aggregates and top-N
//! - Player table filtering and multi-team fixture comparison
//!
//! Every function here is a pure function of the `&Snapshot` it is given.

pub mod aggregate;
pub mod comparison;
pub mod difficulty;
pub mod players;
pub mod rolling;

use thiserror::Error;

use crate::models::{FixtureId, Snapshot, TeamId, Venue};

pub use aggregate::{summarize, SummaryOptions, SummaryScope};
pub use comparison::compare_fixtures;
pub use difficulty::{score, score_all, DifficultyCalculator, StrengthRange};
pub use players::{query_players, PlayerQuery, PlayerRow};
pub use rolling::{rolling, rolling_average, FixtureFilter, MAX_WINDOW, MIN_WINDOW};

/// Errors raised by derivations.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("No data snapshot is available yet")]
    Unavailable,

    #[error("Rolling window must be between 1 and 10, got {0}")]
    InvalidWindow(usize),

    #[error("Unknown fixture {0}")]
    UnknownFixture(FixtureId),

    #[error("Unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("Team {team} does not play {venue} in fixture {fixture}")]
    NotInFixture {
        team: TeamId,
        fixture: FixtureId,
        venue: Venue,
    },
}

/// Resolve an optional snapshot into one that can be derived from.
///
/// No snapshot at all and a snapshot without teams are both reported as
/// [`CalcError::Unavailable`].
pub fn require(snapshot: Option<&Snapshot>) -> Result<&Snapshot, CalcError> {
    match snapshot {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(CalcError::Unavailable),
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
