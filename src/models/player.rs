//! Player ("element") model.
//!
//! The upstream record carries close to a hundred loosely typed fields. The
//! ones the analytics layer works with are promoted to typed, optional fields;
//! everything else is kept verbatim in [`Player::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{PlayerId, TeamId};

/// Playing position, from the API's `element_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    Manager,
}

impl Position {
    pub const PLAYING: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn from_element_type(element_type: u8) -> Option<Self> {
        match element_type {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            5 => Some(Position::Manager),
            _ => None,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
            Position::Manager => "MNG",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Defender => "Defender",
            Position::Midfielder => "Midfielder",
            Position::Forward => "Forward",
            Position::Manager => "Manager",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" | "gkp" | "gk" => Ok(Position::Goalkeeper),
            "defender" | "def" => Ok(Position::Defender),
            "midfielder" | "mid" => Ok(Position::Midfielder),
            "forward" | "fwd" => Ok(Position::Forward),
            "manager" | "mng" => Ok(Position::Manager),
            other => Err(format!("unknown position '{}'", other)),
        }
    }
}

/// Accept a number, a numeric string, an empty string or null.
///
/// Anything that does not parse becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

/// A player record from `bootstrap-static`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    #[serde(default)]
    pub web_name: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub second_name: String,

    pub team: TeamId,

    #[serde(default)]
    pub element_type: u8,

    /// Price in tenths of a million
    #[serde(default, deserialize_with = "lenient_f64")]
    pub now_cost: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_points: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub points_per_game: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub form: Option<f64>,

    /// Ownership percentage
    #[serde(default, deserialize_with = "lenient_f64")]
    pub selected_by_percent: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub goals_scored: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub assists: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub clean_sheets: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub goals_conceded: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub bonus: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub minutes: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub starts: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub saves: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub yellow_cards: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub red_cards: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub ict_index: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub expected_goals: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub expected_assists: Option<f64>,

    /// Upstream fields without a typed accessor
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Player {
    pub fn position(&self) -> Option<Position> {
        Position::from_element_type(self.element_type)
    }

    /// Price in millions.
    pub fn price(&self) -> Option<f64> {
        self.now_cost.map(|c| c / 10.0)
    }

    /// Points per million spent. A zero price counts as 1 so free entries
    /// don't divide by zero.
    pub fn value_score(&self) -> Option<f64> {
        let points = self.total_points?;
        let price = self.price()?;
        let divisor = if price == 0.0 { 1.0 } else { price };
        Some(points / divisor)
    }

    pub fn display_name(&self) -> &str {
        if self.web_name.is_empty() {
            &self.second_name
        } else {
            &self.web_name
        }
    }

    /// Typed accessor for a numeric metric.
    pub fn metric(&self, metric: PlayerMetric) -> Option<f64> {
        match metric {
            PlayerMetric::TotalPoints => self.total_points,
            PlayerMetric::Price => self.price(),
            PlayerMetric::PointsPerGame => self.points_per_game,
            PlayerMetric::Form => self.form,
            PlayerMetric::SelectedByPercent => self.selected_by_percent,
            PlayerMetric::GoalsScored => self.goals_scored,
            PlayerMetric::Assists => self.assists,
            PlayerMetric::CleanSheets => self.clean_sheets,
            PlayerMetric::GoalsConceded => self.goals_conceded,
            PlayerMetric::Bonus => self.bonus,
            PlayerMetric::Minutes => self.minutes,
            PlayerMetric::Starts => self.starts,
            PlayerMetric::Saves => self.saves,
            PlayerMetric::YellowCards => self.yellow_cards,
            PlayerMetric::RedCards => self.red_cards,
            PlayerMetric::IctIndex => self.ict_index,
            PlayerMetric::ExpectedGoals => self.expected_goals,
            PlayerMetric::ExpectedAssists => self.expected_assists,
            PlayerMetric::ValueScore => self.value_score(),
        }
    }
}

/// Numeric player fields the aggregators can group, rank and sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerMetric {
    TotalPoints,
    Price,
    PointsPerGame,
    Form,
    SelectedByPercent,
    GoalsScored,
    Assists,
    CleanSheets,
    GoalsConceded,
    Bonus,
    Minutes,
    Starts,
    Saves,
    YellowCards,
    RedCards,
    IctIndex,
    ExpectedGoals,
    ExpectedAssists,
    ValueScore,
}

impl PlayerMetric {
    pub const ALL: [PlayerMetric; 19] = [
        PlayerMetric::TotalPoints,
        PlayerMetric::Price,
        PlayerMetric::PointsPerGame,
        PlayerMetric::Form,
        PlayerMetric::SelectedByPercent,
        PlayerMetric::GoalsScored,
        PlayerMetric::Assists,
        PlayerMetric::CleanSheets,
        PlayerMetric::GoalsConceded,
        PlayerMetric::Bonus,
        PlayerMetric::Minutes,
        PlayerMetric::Starts,
        PlayerMetric::Saves,
        PlayerMetric::YellowCards,
        PlayerMetric::RedCards,
        PlayerMetric::IctIndex,
        PlayerMetric::ExpectedGoals,
        PlayerMetric::ExpectedAssists,
        PlayerMetric::ValueScore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerMetric::TotalPoints => "total_points",
            PlayerMetric::Price => "price",
            PlayerMetric::PointsPerGame => "points_per_game",
            PlayerMetric::Form => "form",
            PlayerMetric::SelectedByPercent => "selected_by_percent",
            PlayerMetric::GoalsScored => "goals_scored",
            PlayerMetric::Assists => "assists",
            PlayerMetric::CleanSheets => "clean_sheets",
            PlayerMetric::GoalsConceded => "goals_conceded",
            PlayerMetric::Bonus => "bonus",
            PlayerMetric::Minutes => "minutes",
            PlayerMetric::Starts => "starts",
            PlayerMetric::Saves => "saves",
            PlayerMetric::YellowCards => "yellow_cards",
            PlayerMetric::RedCards => "red_cards",
            PlayerMetric::IctIndex => "ict_index",
            PlayerMetric::ExpectedGoals => "expected_goals",
            PlayerMetric::ExpectedAssists => "expected_assists",
            PlayerMetric::ValueScore => "value_score",
        }
    }
}

impl std::fmt::Display for PlayerMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayerMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        let needle = match needle.as_str() {
            "points" => "total_points",
            "ownership" => "selected_by_percent",
            "ppg" => "points_per_game",
            "value" => "value_score",
            "goals" => "goals_scored",
            other => other,
        };
        PlayerMetric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == needle)
            .ok_or_else(|| format!("unknown metric '{}'", s.trim()))
    }
}
