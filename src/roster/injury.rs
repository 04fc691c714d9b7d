use tracing::debug;

use super::provider::TeamRoster;

/// Full-roster totals and who is out, for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamInjuryContext {
    pub team: String,
    pub full_value: f64,
    pub full_advanced: f64,
    pub inactive: Vec<String>,
}

impl TeamInjuryContext {
    pub fn from_roster(team: &str, roster: &TeamRoster) -> Self {
        TeamInjuryContext {
            team: team.to_string(),
            full_value: roster.players.iter().map(|p| p.value()).sum(),
            full_advanced: roster.players.iter().map(|p| p.advanced_value()).sum(),
            inactive: roster.inactive.clone(),
        }
    }
}

/// Team quality left after removing inactive players.
#[derive(Debug, Clone, PartialEq)]
pub struct InjuryImpact {
    /// Full basic value minus inactive players' basic values
    pub value: f64,
    /// Full advanced value minus inactive players' advanced values
    pub advanced: f64,
    pub inactive: Vec<String>,
}

impl InjuryImpact {
    /// Coarse severity label by number of players out.
    pub fn band(&self) -> &'static str {
        match self.inactive.len() {
            0 => "Low",
            1 | 2 => "Medium",
            _ => "High",
        }
    }
}

/// Subtract every inactive player's value from the full-roster totals.
/// Names with no matching roster row subtract nothing.
pub fn evaluate(team: &str, roster: &TeamRoster) -> InjuryImpact {
    let context = TeamInjuryContext::from_roster(team, roster);
    let mut lost_value = 0.0;
    let mut lost_advanced = 0.0;
    for name in &context.inactive {
        match roster.player(name) {
            Some(player) => {
                lost_value += player.value();
                lost_advanced += player.advanced_value();
            }
            None => debug!("{}: inactive player '{}' not on roster, ignoring", team, name),
        }
    }
    InjuryImpact {
        value: context.full_value - lost_value,
        advanced: context.full_advanced - lost_advanced,
        inactive: context.inactive,
    }
}
