use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod api;
mod cache;
mod config;
mod db;
mod error;
mod features;
mod model;
mod predictor;
mod roster;
mod teams;

use api::AppState;
use cache::PredictionCache;
use config::Config;
use db::Database;
use model::{Classifier, ModelArtifact};
use predictor::Predictor;
use roster::{JsonRosterDir, RosterSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open database
    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    if let Some(path) = &config.import_games {
        db.import_games_json(path)
            .with_context(|| format!("Failed to import games from {}", path))?;
    }
    info!("{} game(s) available for feature windows", db.game_count()?);
    for city in teams::all_cities() {
        match db.dates_played(city)?.last() {
            Some(last) => debug!("{} last played {}", city, last),
            None => warn!("No game history for {}; its features will be zero", city),
        }
    }

    // Load the classifier; a missing or mismatched artifact is fatal
    let model = ModelArtifact::load(&config.model_path)?;
    let model_info = model.info();
    info!(
        "Model loaded: {} ({} features, {:.2}% hold-out accuracy)",
        model_info.model_type, model_info.features, model_info.accuracy
    );

    let rosters = JsonRosterDir::new(&config.roster_dir);
    info!("Roster source: {} ({})", rosters.name(), config.roster_dir);

    let predictor = Predictor::new(
        Arc::new(db),
        Arc::new(rosters),
        Arc::new(model),
        PredictionCache::new(config.stats_cache_capacity),
    );

    let app = api::router(AppState {
        predictor: Arc::new(predictor),
    });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Prediction API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
