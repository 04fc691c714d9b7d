//! The thirty franchises the predictor knows about, keyed by the city name
//! used throughout the stats store.

/// City name → basketball-reference abbreviation, alphabetical by city.
pub const TEAMS: [(&str, &str); 30] = [
    ("Atlanta", "ATL"),
    ("Boston", "BOS"),
    ("Brooklyn", "BRK"),
    ("Charlotte", "CHO"),
    ("Chicago", "CHI"),
    ("Cleveland", "CLE"),
    ("Dallas", "DAL"),
    ("Denver", "DEN"),
    ("Detroit", "DET"),
    ("Golden State", "GSW"),
    ("Houston", "HOU"),
    ("Indiana", "IND"),
    ("LA Clippers", "LAC"),
    ("LA Lakers", "LAL"),
    ("Memphis", "MEM"),
    ("Miami", "MIA"),
    ("Milwaukee", "MIL"),
    ("Minnesota", "MIN"),
    ("New Orleans", "NOP"),
    ("New York", "NYK"),
    ("Oklahoma City", "OKC"),
    ("Orlando", "ORL"),
    ("Philadelphia", "PHI"),
    ("Phoenix", "PHO"),
    ("Portland", "POR"),
    ("Sacramento", "SAC"),
    ("San Antonio", "SAS"),
    ("Toronto", "TOR"),
    ("Utah", "UTA"),
    ("Washington", "WAS"),
];

/// Abbreviation for a known city name (exact, case-sensitive match).
pub fn abbreviation(city: &str) -> Option<&'static str> {
    TEAMS
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, abbr)| *abbr)
}

pub fn is_known(city: &str) -> bool {
    abbreviation(city).is_some()
}

pub fn all_cities() -> Vec<&'static str> {
    TEAMS.iter().map(|(name, _)| *name).collect()
}
