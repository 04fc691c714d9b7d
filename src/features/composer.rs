use chrono::NaiveDate;

use super::window::{average_metric, lookback, MetricAverage, LONG_WINDOW_DAYS, SHORT_WINDOW_DAYS};
use crate::db::models::Metric;
use crate::db::StatsStore;
use crate::error::Result;

/// Composed (home, away) value for one four-factor metric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricPair {
    pub home: f64,
    pub away: f64,
}

/// All four composed metrics for one (date, home, away).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourFactors {
    pub off_rtg: MetricPair,
    pub efg_pct: MetricPair,
    pub tov_pct: MetricPair,
    pub orb_pct: MetricPair,
}

impl FourFactors {
    pub fn get(&self, metric: Metric) -> MetricPair {
        match metric {
            Metric::OffRtg => self.off_rtg,
            Metric::EfgPct => self.efg_pct,
            Metric::TovPct => self.tov_pct,
            Metric::OrbPct => self.orb_pct,
        }
    }

    fn set(&mut self, metric: Metric, pair: MetricPair) {
        match metric {
            Metric::OffRtg => self.off_rtg = pair,
            Metric::EfgPct => self.efg_pct = pair,
            Metric::TovPct => self.tov_pct = pair,
            Metric::OrbPct => self.orb_pct = pair,
        }
    }
}

/// Blend each side's own output with what the other side's opponents
/// produced: home = (home.team + away.opponent) / 2, away mirrored.
fn cross_blend(home: MetricAverage, away: MetricAverage) -> MetricPair {
    MetricPair {
        home: (home.team + away.opponent) / 2.0,
        away: (away.team + home.opponent) / 2.0,
    }
}

/// Compose one metric: the mean of the 30-day and 7-day cross blends.
pub fn compose_metric(
    store: &dyn StatsStore,
    metric: Metric,
    date: NaiveDate,
    home: &str,
    away: &str,
) -> Result<MetricPair> {
    let long = lookback(date, LONG_WINDOW_DAYS);
    let long_pair = cross_blend(
        average_metric(store, &long, home, metric)?,
        average_metric(store, &long, away, metric)?,
    );

    let short = lookback(date, SHORT_WINDOW_DAYS);
    let short_pair = cross_blend(
        average_metric(store, &short, home, metric)?,
        average_metric(store, &short, away, metric)?,
    );

    Ok(MetricPair {
        home: (long_pair.home + short_pair.home) / 2.0,
        away: (long_pair.away + short_pair.away) / 2.0,
    })
}

/// Compose all four factors for a matchup.
pub fn compose_four_factors(
    store: &dyn StatsStore,
    date: NaiveDate,
    home: &str,
    away: &str,
) -> Result<FourFactors> {
    let mut factors = FourFactors::default();
    for metric in Metric::ALL {
        factors.set(metric, compose_metric(store, metric, date, home, away)?);
    }
    Ok(factors)
}
