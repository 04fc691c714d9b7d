use std::path::{Path, PathBuf};
use tracing::debug;

use super::provider::{RosterSource, TeamRoster};
use crate::error::{PredictError, Result};
use crate::teams;

/// Roster source backed by a directory of per-team snapshot files named by
/// team abbreviation, e.g. `BOS.json`:
///
/// ```json
/// { "players": [{"name": "...", "ppg": 20.1, "rpg": 5.2, "apg": 4.0,
///                "spg": 1.1, "bpg": 0.4, "vorp": 2.3, "ws": 6.8}],
///   "inactive": ["..."] }
/// ```
pub struct JsonRosterDir {
    dir: PathBuf,
}

impl JsonRosterDir {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        JsonRosterDir {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, team: &str) -> Result<PathBuf> {
        let abbr = teams::abbreviation(team)
            .ok_or_else(|| {
                PredictError::DataUnavailable(format!("no roster file for team '{}'", team))
            })?;
        Ok(self.dir.join(format!("{}.json", abbr)))
    }
}

impl RosterSource for JsonRosterDir {
    fn name(&self) -> &str {
        "JsonRosterDir"
    }

    fn team_roster(&self, team: &str) -> Result<TeamRoster> {
        let path = self.path_for(team)?;
        debug!("Loading roster for {} from {}", team, path.display());
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            PredictError::DataUnavailable(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            PredictError::DataUnavailable(format!("failed to parse {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nba-rosters-{}-{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_roster_by_abbreviation() {
        let dir = temp_dir("load");
        std::fs::write(
            dir.join("GSW.json"),
            r#"{"players": [{"name": "Shooter", "ppg": 25.0, "vorp": 3.0, "ws": 8.0}],
                "inactive": ["Shooter"]}"#,
        )
        .unwrap();

        let source = JsonRosterDir::new(&dir);
        let roster = source.team_roster("Golden State").unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(roster.players.len(), 1);
        assert_eq!(roster.inactive, vec!["Shooter".to_string()]);
        assert!(roster.player("Shooter").is_some());
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let dir = temp_dir("missing");
        let source = JsonRosterDir::new(&dir);
        let err = source.team_roster("Utah").unwrap_err();
        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(err, PredictError::DataUnavailable(_)));
    }

    #[test]
    fn malformed_file_is_data_unavailable() {
        let dir = temp_dir("malformed");
        std::fs::write(dir.join("UTA.json"), "{not json").unwrap();
        let err = JsonRosterDir::new(&dir).team_roster("Utah").unwrap_err();
        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(err, PredictError::DataUnavailable(_)));
    }
}
