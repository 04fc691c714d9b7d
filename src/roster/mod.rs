pub mod injury;
pub mod json_dir;
pub mod provider;

pub use injury::{evaluate, InjuryImpact, TeamInjuryContext};
pub use json_dir::JsonRosterDir;
pub use provider::{RosterPlayer, RosterSource, TeamRoster};
