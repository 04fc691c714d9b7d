use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A completed game. Natural key: (date, home_team, away_team).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
}

impl Game {
    pub fn home_win(&self) -> bool {
        self.home_score > self.away_score
    }
}

/// One team's four-factor line for a game, stored alongside what its
/// opponent did in the same game so a single row answers either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamStatLine {
    pub off_rtg: f64,
    pub opp_off_rtg: f64,
    pub efg_pct: f64,
    pub opp_efg_pct: f64,
    pub tov_pct: f64,
    pub opp_tov_pct: f64,
    pub orb_pct: f64,
    pub opp_orb_pct: f64,
}

impl TeamStatLine {
    /// The opponent's view of the same game: team and opp columns swapped.
    pub fn mirrored(&self) -> Self {
        TeamStatLine {
            off_rtg: self.opp_off_rtg,
            opp_off_rtg: self.off_rtg,
            efg_pct: self.opp_efg_pct,
            opp_efg_pct: self.efg_pct,
            tov_pct: self.opp_tov_pct,
            opp_tov_pct: self.tov_pct,
            orb_pct: self.opp_orb_pct,
            opp_orb_pct: self.orb_pct,
        }
    }
}

/// The four factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    OffRtg,
    EfgPct,
    TovPct,
    OrbPct,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::OffRtg, Metric::EfgPct, Metric::TovPct, Metric::OrbPct];

    /// (team column, opponent column) in `team_stats`.
    pub fn columns(self) -> (&'static str, &'static str) {
        match self {
            Metric::OffRtg => ("off_rtg", "opp_off_rtg"),
            Metric::EfgPct => ("efg_pct", "opp_efg_pct"),
            Metric::TovPct => ("tov_pct", "opp_tov_pct"),
            Metric::OrbPct => ("orb_pct", "opp_orb_pct"),
        }
    }

    pub fn as_str(self) -> &'static str {
        self.columns().0
    }
}

/// One observed (team, opponent) value pair for a metric on a date.
/// Absence ("no game that day") is modelled as `Option::None` by callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub team: f64,
    pub opponent: f64,
}

/// Ingestion record: a game plus both teams' stat lines. The away line may
/// be omitted, in which case it is the home line mirrored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game: Game,
    pub home: TeamStatLine,
    #[serde(default)]
    pub away: Option<TeamStatLine>,
}

impl GameRecord {
    pub fn away_line(&self) -> TeamStatLine {
        self.away.unwrap_or_else(|| self.home.mirrored())
    }
}
