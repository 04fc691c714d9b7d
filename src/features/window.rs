//! Lookback windows and the windowed metric aggregator.
//!
//! A window is a list of calendar days ending the day before the prediction
//! date, most recent first. Averages over a window that holds fewer than
//! [`MIN_SAMPLES`] games are padded with older games: the search walks
//! backward in [`EXPANSION_BLOCK_DAYS`]-day blocks starting
//! [`EXPANSION_BLOCK_DAYS`] days before the earliest window day, until the
//! minimum is met or the block offset passes [`EXPANSION_BUDGET_DAYS`].

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::db::models::Metric;
use crate::db::StatsStore;
use crate::error::Result;

pub const MIN_SAMPLES: usize = 10;
pub const EXPANSION_BLOCK_DAYS: i64 = 30;
pub const EXPANSION_BUDGET_DAYS: i64 = 200;

pub const LONG_WINDOW_DAYS: i64 = 30;
pub const SHORT_WINDOW_DAYS: i64 = 7;

/// Upper bound on how far before the prediction date any lookup reaches.
pub const MAX_LOOKBACK_DAYS: i64 = LONG_WINDOW_DAYS + EXPANSION_BUDGET_DAYS + EXPANSION_BLOCK_DAYS;

/// Whether every window and expansion block for `date` is representable.
pub fn has_lookback_room(date: NaiveDate) -> bool {
    date.checked_sub_signed(Duration::days(MAX_LOOKBACK_DAYS)).is_some()
}

/// Average team and opponent value of one metric over a window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricAverage {
    pub team: f64,
    pub opponent: f64,
}

/// The `days` calendar days strictly before `date`, most recent first.
/// Days before the earliest representable date are left out.
pub fn lookback(date: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (1..=days)
        .map_while(|i| date.checked_sub_signed(Duration::days(i)))
        .collect()
}

#[derive(Default)]
struct Running {
    team: f64,
    opponent: f64,
    count: usize,
}

impl Running {
    fn average(&self) -> MetricAverage {
        if self.count == 0 {
            return MetricAverage::default();
        }
        let n = self.count as f64;
        MetricAverage {
            team: self.team / n,
            opponent: self.opponent / n,
        }
    }
}

/// Average `metric` for `team` over `dates` (most recent first), with the
/// expansion fallback. Returns `{0, 0}` only when the whole search found no
/// games at all.
pub fn average_metric(
    store: &dyn StatsStore,
    dates: &[NaiveDate],
    team: &str,
    metric: Metric,
) -> Result<MetricAverage> {
    let mut running = Running::default();
    for sample in store.stats_for(team, dates, metric)?.into_iter().flatten() {
        running.team += sample.team;
        running.opponent += sample.opponent;
        running.count += 1;
    }

    if running.count < MIN_SAMPLES {
        if let Some(&earliest) = dates.last() {
            let in_window = running.count;
            let mut days_back = EXPANSION_BLOCK_DAYS;
            while running.count < MIN_SAMPLES && days_back <= EXPANSION_BUDGET_DAYS {
                let block: Vec<NaiveDate> = (days_back..days_back + EXPANSION_BLOCK_DAYS)
                    .map_while(|i| earliest.checked_sub_signed(Duration::days(i)))
                    .collect();
                for sample in store.stats_for(team, &block, metric)?.into_iter().flatten() {
                    running.team += sample.team;
                    running.opponent += sample.opponent;
                    running.count += 1;
                    if running.count >= MIN_SAMPLES {
                        break;
                    }
                }
                days_back += EXPANSION_BLOCK_DAYS;
            }
            debug!(
                "Expanded {} {} window: {} in window, {} after expansion",
                team,
                metric.as_str(),
                in_window,
                running.count
            );
        }
    }

    Ok(running.average())
}
