use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One player's season line: per-game box-score averages plus the two
/// advanced metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub name: String,
    #[serde(default)]
    pub ppg: f64,
    #[serde(default)]
    pub rpg: f64,
    #[serde(default)]
    pub apg: f64,
    #[serde(default)]
    pub spg: f64,
    #[serde(default)]
    pub bpg: f64,
    /// Value over replacement player
    #[serde(default)]
    pub vorp: f64,
    /// Win shares
    #[serde(default)]
    pub ws: f64,
}

impl RosterPlayer {
    /// ppg + 1.2·rpg + 1.5·apg + 2·spg + 2·bpg
    pub fn value(&self) -> f64 {
        self.ppg + 1.2 * self.rpg + 1.5 * self.apg + 2.0 * self.spg + 2.0 * self.bpg
    }

    /// vorp × ws
    pub fn advanced_value(&self) -> f64 {
        self.vorp * self.ws
    }
}

/// A team's current roster snapshot and who is out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
    /// Names of currently inactive / injured players
    #[serde(default)]
    pub inactive: Vec<String>,
}

impl TeamRoster {
    pub fn player(&self, name: &str) -> Option<&RosterPlayer> {
        self.players.iter().find(|p| p.name == name)
    }
}

/// Source of roster and injury data for a team.
pub trait RosterSource: Send + Sync {
    fn team_roster(&self, team: &str) -> Result<TeamRoster>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
