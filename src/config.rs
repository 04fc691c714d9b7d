use clap::Parser;

/// NBA game predictor API
#[derive(Parser, Debug, Clone)]
#[command(name = "nba-predictor", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// SQLite database path (games + four-factor team stats)
    #[arg(long, env = "DATABASE_PATH", default_value = "data/nba_data.db")]
    pub database_path: String,

    /// Trained classifier artifact (JSON)
    #[arg(long, env = "MODEL_PATH", default_value = "models/trained_model.json")]
    pub model_path: String,

    /// Directory holding one roster file per team (`<ABBR>.json`)
    #[arg(long, env = "ROSTER_DIR", default_value = "data/rosters")]
    pub roster_dir: String,

    /// Maximum number of (date, home, away) feature sets kept in memory
    #[arg(long, env = "STATS_CACHE_CAPACITY", default_value = "1024")]
    pub stats_cache_capacity: usize,

    /// Optional JSON file of games to ingest before serving
    #[arg(long, env = "IMPORT_GAMES")]
    pub import_games: Option<String>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.stats_cache_capacity == 0 {
            anyhow::bail!("stats_cache_capacity must be at least 1");
        }
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("listen_addr '{}' is not a valid socket address", self.listen_addr);
        }
        if self.model_path.trim().is_empty() {
            anyhow::bail!("model_path must not be empty");
        }
        Ok(())
    }
}
