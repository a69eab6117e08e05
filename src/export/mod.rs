//! Plain tabular output and CSV rendering.
//!
//! Every derived result the API and CLI expose can be flattened into a
//! [`Table`] of strings, which renders to CSV.

use thiserror::Error;

use crate::calculate::PlayerRow;
use crate::models::{
    DifficultyScore, FixtureComparison, PlayerMetric, RollingComparison, Snapshot, TeamSummary,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush CSV output: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// A header row plus data rows of equal width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

/// Anything that can be flattened into rows and columns.
pub trait Tabular {
    fn to_table(&self) -> Table;
}

fn fixed(value: f64) -> String {
    format!("{:.2}", value)
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for [DifficultyScore] {
    fn to_table(&self) -> Table {
        let mut table = Table::new([
            "fixture_id",
            "gameweek",
            "team_id",
            "opponent_id",
            "venue",
            "difficulty",
        ]);
        for s in self {
            table.push(vec![
                s.fixture_id.to_string(),
                s.gameweek.map(|gw| gw.to_string()).unwrap_or_default(),
                s.team_id.to_string(),
                s.opponent_id.to_string(),
                s.venue.to_string(),
                fixed(s.score),
            ]);
        }
        table
    }
}

/// Wide layout: one row per gameweek, one column per team.
impl Tabular for RollingComparison {
    fn to_table(&self) -> Table {
        let mut headers = vec!["gameweek".to_string()];
        headers.extend(self.series.values().map(|s| s.team_name.clone()));
        let mut table = Table::new(headers);

        let columns: Vec<&Vec<Option<f64>>> = self.aligned.values().collect();

        for (idx, gameweek) in self.gameweeks.iter().enumerate() {
            let mut row = vec![gameweek.to_string()];
            row.extend(columns.iter().map(|c| c[idx].map(fixed).unwrap_or_default()));
            table.push(row);
        }
        table
    }
}

impl Tabular for [TeamSummary] {
    fn to_table(&self) -> Table {
        let mut headers = vec![
            "team_id".to_string(),
            "team_name".to_string(),
            "player_count".to_string(),
        ];
        for metric in PlayerMetric::ALL {
            headers.push(format!("sum_{}", metric));
            headers.push(format!("mean_{}", metric));
        }
        headers.push("top_players".to_string());
        let mut table = Table::new(headers);

        for summary in self {
            let mut row = vec![
                summary.team_id.to_string(),
                summary.team_name.clone(),
                summary.player_count.to_string(),
            ];
            for metric in PlayerMetric::ALL {
                row.push(summary.sums.get(&metric).copied().map(fixed).unwrap_or_default());
                row.push(summary.means.get(&metric).copied().map(fixed).unwrap_or_default());
            }
            let top = summary
                .top_n
                .iter()
                .map(|p| format!("{} ({})", p.name, p.value))
                .collect::<Vec<_>>()
                .join("; ");
            row.push(top);
            table.push(row);
        }
        table
    }
}

impl Tabular for [PlayerRow] {
    fn to_table(&self) -> Table {
        let mut table = Table::new([
            "player_id",
            "name",
            "team",
            "position",
            "price",
            "total_points",
            "points_per_game",
            "selected_by_percent",
            "form",
            "value_score",
            "goals_scored",
            "assists",
            "clean_sheets",
            "bonus",
            "minutes",
            "starts",
            "ict_index",
            "expected_goals",
            "expected_assists",
        ]);
        for r in self {
            table.push(vec![
                r.player_id.to_string(),
                r.name.clone(),
                r.team_name.clone(),
                r.position.map(|p| p.to_string()).unwrap_or_default(),
                opt(r.price),
                opt(r.total_points),
                opt(r.points_per_game),
                opt(r.selected_by_percent),
                opt(r.form),
                r.value_score.map(fixed).unwrap_or_default(),
                opt(r.goals_scored),
                opt(r.assists),
                opt(r.clean_sheets),
                opt(r.bonus),
                opt(r.minutes),
                opt(r.starts),
                opt(r.ict_index),
                opt(r.expected_goals),
                opt(r.expected_assists),
            ]);
        }
        table
    }
}

impl Tabular for FixtureComparison {
    fn to_table(&self) -> Table {
        let mut table = Table::new([
            "team",
            "gameweek",
            "opponent",
            "venue",
            "fpl_difficulty",
            "difficulty",
            "kickoff_time",
        ]);
        for r in &self.rows {
            table.push(vec![
                r.team_name.clone(),
                r.gameweek.to_string(),
                r.opponent.clone(),
                r.venue.short_label().to_string(),
                r.fpl_difficulty.map(|d| d.to_string()).unwrap_or_default(),
                fixed(r.difficulty),
                r.kickoff_time.map(|k| k.to_rfc3339()).unwrap_or_default(),
            ]);
        }
        table
    }
}

/// Team list with raw strength ratings.
impl Tabular for Snapshot {
    fn to_table(&self) -> Table {
        let mut table = Table::new([
            "team_id",
            "name",
            "short_name",
            "strength",
            "attack_home",
            "attack_away",
            "defence_home",
            "defence_away",
            "overall_home",
            "overall_away",
        ]);
        for t in &self.teams {
            table.push(vec![
                t.id.to_string(),
                t.name.clone(),
                t.short_name.clone(),
                t.strength.to_string(),
                t.strength_attack_home.to_string(),
                t.strength_attack_away.to_string(),
                t.strength_defence_home.to_string(),
                t.strength_defence_away.to_string(),
                t.strength_overall_home.to_string(),
                t.strength_overall_away.to_string(),
            ]);
        }
        table
    }
}
