//! Premier League team model.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// Which side of a fixture a team plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Home,
    Away,
}

impl Venue {
    /// The venue the opponent plays at.
    pub fn opposite(self) -> Self {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
        }
    }

    /// One-letter label used in fixture tables.
    pub fn short_label(self) -> &'static str {
        match self {
            Venue::Home => "H",
            Venue::Away => "A",
        }
    }
}

impl std::fmt::Display for Venue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Venue::Home => write!(f, "home"),
            Venue::Away => write!(f, "away"),
        }
    }
}

impl std::str::FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Ok(Venue::Home),
            "away" | "a" => Ok(Venue::Away),
            other => Err(format!("unknown venue '{}'", other)),
        }
    }
}

/// A team as published in `bootstrap-static`.
///
/// Strength ratings are on the API's raw scale (roughly 1000..1400).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,

    pub name: String,

    #[serde(default)]
    pub short_name: String,

    /// Overall 1..5 tier
    #[serde(default)]
    pub strength: u8,

    pub strength_overall_home: f64,
    pub strength_overall_away: f64,
    pub strength_attack_home: f64,
    pub strength_attack_away: f64,
    pub strength_defence_home: f64,
    pub strength_defence_away: f64,
}

impl Team {
    /// Attack rating when playing at `venue`.
    pub fn attack(&self, venue: Venue) -> f64 {
        match venue {
            Venue::Home => self.strength_attack_home,
            Venue::Away => self.strength_attack_away,
        }
    }

    /// Defence rating when playing at `venue`.
    pub fn defence(&self, venue: Venue) -> f64 {
        match venue {
            Venue::Home => self.strength_defence_home,
            Venue::Away => self.strength_defence_away,
        }
    }

    /// Attack and defence at `venue` blended into one magnitude.
    pub fn blended_strength(&self, venue: Venue) -> f64 {
        (self.attack(venue) + self.defence(venue)) / 2.0
    }
}
