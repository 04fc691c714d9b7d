use chrono::NaiveDate;

use super::models::{Metric, MetricSample};
use super::Database;
use crate::error::{PredictError, Result};

/// Read-only historical stats lookups the feature pipeline needs.
pub trait StatsStore: Send + Sync {
    /// Samples aligned 1:1 with `dates`; `None` where `team` did not play.
    fn stats_for(
        &self,
        team: &str,
        dates: &[NaiveDate],
        metric: Metric,
    ) -> Result<Vec<Option<MetricSample>>>;

    fn home_win(&self, date: NaiveDate, home: &str, away: &str) -> Result<Option<bool>>;

    /// True iff `team` has a stat line on the calendar day before `date`.
    fn played_on_previous_day(&self, team: &str, date: NaiveDate) -> Result<bool>;

    /// (home, away) back-to-back flags for a game on `date`.
    fn back_to_back(&self, date: NaiveDate, home: &str, away: &str) -> Result<(bool, bool)> {
        Ok((
            self.played_on_previous_day(home, date)?,
            self.played_on_previous_day(away, date)?,
        ))
    }
}

impl StatsStore for Database {
    fn stats_for(
        &self,
        team: &str,
        dates: &[NaiveDate],
        metric: Metric,
    ) -> Result<Vec<Option<MetricSample>>> {
        self.metric_samples(team, dates, metric)
            .map_err(PredictError::data_unavailable)
    }

    fn home_win(&self, date: NaiveDate, home: &str, away: &str) -> Result<Option<bool>> {
        Database::home_win(self, date, home, away).map_err(PredictError::data_unavailable)
    }

    fn played_on_previous_day(&self, team: &str, date: NaiveDate) -> Result<bool> {
        let Some(previous) = date.pred_opt() else {
            return Ok(false);
        };
        self.played_on(team, previous)
            .map_err(PredictError::data_unavailable)
    }
}
