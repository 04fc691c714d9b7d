use anyhow::{Context, Result};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub mod models;
pub mod store;

use models::*;
pub use store::StatsStore;

/// Thread-safe SQLite handle (single connection behind a mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Ingestion ─────────────────────────────────────────────────────────────

    /// Insert a game and both of its stat lines. Re-inserting the same
    /// (date, home, away) replaces the scores and stat lines.
    pub fn insert_game(&self, record: &GameRecord) -> Result<i64> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let game = &record.game;
        tx.execute(
            "INSERT INTO games (date, home_team, away_team, home_score, away_score, home_win)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(date, home_team, away_team) DO UPDATE SET
                home_score=excluded.home_score,
                away_score=excluded.away_score,
                home_win=excluded.home_win",
            params![
                game.date,
                game.home_team,
                game.away_team,
                game.home_score,
                game.away_score,
                game.home_win(),
            ],
        )?;
        let game_id: i64 = tx.query_row(
            "SELECT id FROM games WHERE date=?1 AND home_team=?2 AND away_team=?3",
            params![game.date, game.home_team, game.away_team],
            |row| row.get(0),
        )?;
        tx.execute("DELETE FROM team_stats WHERE game_id=?1", params![game_id])?;
        for (team, is_home, line) in [
            (&game.home_team, true, record.home),
            (&game.away_team, false, record.away_line()),
        ] {
            tx.execute(
                "INSERT INTO team_stats (
                    game_id, team, is_home,
                    off_rtg, opp_off_rtg, efg_pct, opp_efg_pct,
                    tov_pct, opp_tov_pct, orb_pct, opp_orb_pct
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                params![
                    game_id,
                    team,
                    is_home,
                    line.off_rtg,
                    line.opp_off_rtg,
                    line.efg_pct,
                    line.opp_efg_pct,
                    line.tov_pct,
                    line.opp_tov_pct,
                    line.orb_pct,
                    line.opp_orb_pct,
                ],
            )?;
        }
        tx.commit()?;
        Ok(game_id)
    }

    /// Bulk-load a JSON array of `GameRecord`s. Returns the number ingested.
    pub fn import_games_json(&self, path: &str) -> Result<usize> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read games file {}", path))?;
        let records: Vec<GameRecord> =
            serde_json::from_str(&raw).context("Failed to parse games file")?;
        for record in &records {
            self.insert_game(record).with_context(|| {
                format!(
                    "Failed to ingest {} {} @ {}",
                    record.game.date, record.game.away_team, record.game.home_team
                )
            })?;
        }
        info!("Imported {} games from {}", records.len(), path);
        Ok(records.len())
    }

    // ── Lookups ───────────────────────────────────────────────────────────────

    /// Metric samples for `team` on each of `dates`, aligned 1:1 with the
    /// input. Dates without a recorded game map to `None`.
    pub fn metric_samples(
        &self,
        team: &str,
        dates: &[NaiveDate],
        metric: Metric,
    ) -> Result<Vec<Option<MetricSample>>> {
        if dates.is_empty() {
            return Ok(vec![]);
        }
        let (team_col, opp_col) = metric.columns();
        let placeholders = (0..dates.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "SELECT g.date, ts.{team_col}, ts.{opp_col}
             FROM team_stats ts
             JOIN games g ON ts.game_id = g.id
             WHERE ts.team = ?1 AND g.date IN ({placeholders})"
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let bind = std::iter::once(team.to_string()).chain(dates.iter().map(|d| d.to_string()));
        let rows = stmt
            .query_map(params_from_iter(bind), |row| {
                Ok((
                    row.get::<_, NaiveDate>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let by_date: HashMap<NaiveDate, MetricSample> = rows
            .into_iter()
            .filter_map(|(date, team_val, opp_val)| {
                Some((date, MetricSample { team: team_val?, opponent: opp_val? }))
            })
            .collect();

        Ok(dates.iter().map(|d| by_date.get(d).copied()).collect())
    }

    /// Whether the home side won the recorded game, if there is one
    pub fn home_win(&self, date: NaiveDate, home: &str, away: &str) -> Result<Option<bool>> {
        let conn = self.conn.lock();
        let result = conn
            .query_row(
                "SELECT home_win FROM games WHERE date=?1 AND home_team=?2 AND away_team=?3",
                params![date, home, away],
                |row| row.get::<_, Option<bool>>(0),
            )
            .optional()?;
        Ok(result.flatten())
    }

    /// Whether `team` has a stat line on exactly `date`
    pub fn played_on(&self, team: &str, date: NaiveDate) -> Result<bool> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*)
             FROM team_stats ts
             JOIN games g ON ts.game_id = g.id
             WHERE ts.team = ?1 AND g.date = ?2",
            params![team, date],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Every date `team` played, ascending
    pub fn dates_played(&self, team: &str) -> Result<Vec<NaiveDate>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT g.date
             FROM team_stats ts
             JOIN games g ON ts.game_id = g.id
             WHERE ts.team = ?1
             ORDER BY g.date",
        )?;
        let dates = stmt
            .query_map(params![team], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;
        Ok(dates)
    }

    pub fn game_count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM games", [], |r| r.get(0))?;
        Ok(count)
    }
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    date        TEXT    NOT NULL,
    home_team   TEXT    NOT NULL,
    away_team   TEXT    NOT NULL,
    home_score  REAL,
    away_score  REAL,
    home_win    INTEGER,
    UNIQUE(date, home_team, away_team)
);

CREATE TABLE IF NOT EXISTS team_stats (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id     INTEGER NOT NULL,
    team        TEXT    NOT NULL,
    is_home     INTEGER NOT NULL,
    off_rtg     REAL,
    opp_off_rtg REAL,
    efg_pct     REAL,
    opp_efg_pct REAL,
    tov_pct     REAL,
    opp_tov_pct REAL,
    orb_pct     REAL,
    opp_orb_pct REAL,
    FOREIGN KEY (game_id) REFERENCES games(id)
);

CREATE INDEX IF NOT EXISTS idx_games_date ON games(date);
CREATE INDEX IF NOT EXISTS idx_games_teams ON games(home_team, away_team);
CREATE INDEX IF NOT EXISTS idx_team_stats_team ON team_stats(team);
CREATE INDEX IF NOT EXISTS idx_team_stats_game ON team_stats(game_id);
"#;
