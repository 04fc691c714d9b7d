//! Prediction entry points: validate the request, gather features through
//! the caches, run the classifier.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::cache::{PredictionCache, StatsKey};
use crate::db::models::Metric;
use crate::db::StatsStore;
use crate::error::{PredictError, Result};
use crate::features::{compose_four_factors, window, FeatureVector, FourFactors};
use crate::model::{Classifier, ModelInfo};
use crate::roster::{self, InjuryImpact, RosterSource};
use crate::teams;

/// Date used when a request does not name one (last day of the 2024-25
/// regular season).
pub const DEFAULT_DATE: &str = "2025-04-14";

/// Absolute difference below which a comparison row is called "even".
pub const EVEN_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub winner: String,
    /// Probability of the predicted outcome (0.5–1.0)
    pub confidence: f64,
    pub home_team: String,
    pub away_team: String,
    pub prediction_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    Home,
    Away,
    Even,
}

impl Advantage {
    fn between(home: f64, away: f64, lower_is_better: bool) -> Self {
        if (home - away).abs() < EVEN_TOLERANCE {
            return Advantage::Even;
        }
        if (home > away) != lower_is_better {
            Advantage::Home
        } else {
            Advantage::Away
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: String,
    pub home: String,
    pub away: String,
    pub advantage: Advantage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideBreakdown {
    pub off_rtg: f64,
    pub efg_pct: f64,
    pub tov_pct: f64,
    pub orb_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub home: SideBreakdown,
    pub away: SideBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub home_team: String,
    pub away_team: String,
    pub prediction_date: NaiveDate,
    pub stats: Vec<MetricComparison>,
    pub breakdown: Breakdown,
}

pub struct Predictor {
    store: Arc<dyn StatsStore>,
    rosters: Arc<dyn RosterSource>,
    classifier: Arc<dyn Classifier>,
    cache: PredictionCache,
}

impl Predictor {
    pub fn new(
        store: Arc<dyn StatsStore>,
        rosters: Arc<dyn RosterSource>,
        classifier: Arc<dyn Classifier>,
        cache: PredictionCache,
    ) -> Self {
        Predictor {
            store,
            rosters,
            classifier,
            cache,
        }
    }

    /// Check both teams, then the date. Nothing is looked up before this
    /// passes.
    pub fn validate(&self, home: &str, away: &str, date: Option<&str>) -> Result<NaiveDate> {
        for team in [home, away] {
            if !teams::is_known(team) {
                return Err(PredictError::InvalidTeam(team.to_string()));
            }
        }
        let raw = date.unwrap_or(DEFAULT_DATE);
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .filter(|d| window::has_lookback_room(*d))
            .ok_or_else(|| PredictError::InvalidDate(raw.to_string()))
    }

    fn four_factors(&self, date: NaiveDate, home: &str, away: &str) -> Result<FourFactors> {
        let key = StatsKey::new(date, home, away);
        self.cache
            .team_stats(&key, || compose_four_factors(self.store.as_ref(), date, home, away))
    }

    fn injury_impact(&self, team: &str) -> Result<InjuryImpact> {
        self.cache.injuries(team, || {
            let team_roster = self.rosters.team_roster(team)?;
            Ok(roster::evaluate(team, &team_roster))
        })
    }

    /// The twelve classifier inputs for a validated matchup.
    pub fn feature_vector(&self, date: NaiveDate, home: &str, away: &str) -> Result<FeatureVector> {
        let factors = self.four_factors(date, home, away)?;
        let home_injuries = self.injury_impact(home)?;
        let away_injuries = self.injury_impact(away)?;
        Ok(FeatureVector::assemble(&factors, &home_injuries, &away_injuries))
    }

    pub fn predict(&self, home: &str, away: &str, date: Option<&str>) -> Result<Prediction> {
        let date = self.validate(home, away, date)?;
        let features = self.feature_vector(date, home, away)?;
        let outcome = self.classifier.classify(&features)?;

        let winner = if outcome.home_win { home } else { away };
        let prediction = Prediction {
            winner: winner.to_string(),
            confidence: outcome.confidence(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            prediction_date: date,
        };
        info!(
            "Predicted {} @ {} on {}: {} ({:.1}%)",
            away,
            home,
            date,
            prediction.winner,
            prediction.confidence * 100.0
        );
        Ok(prediction)
    }

    /// Actual winner if the game is already in the store.
    pub fn recorded_winner(
        &self,
        home: &str,
        away: &str,
        date: NaiveDate,
    ) -> Result<Option<String>> {
        Ok(self
            .store
            .home_win(date, home, away)?
            .map(|home_won| if home_won { home } else { away }.to_string()))
    }

    /// Per-metric side-by-side of the features the model sees.
    pub fn compare_teams(
        &self,
        home: &str,
        away: &str,
        date: Option<&str>,
    ) -> Result<TeamComparison> {
        let date = self.validate(home, away, date)?;
        let f = self.four_factors(date, home, away)?;
        let home_injuries = self.injury_impact(home)?;
        let away_injuries = self.injury_impact(away)?;
        let (home_b2b, away_b2b) = self.store.back_to_back(date, home, away)?;

        let row = |metric: &str, home_fmt: String, away_fmt: String, advantage: Advantage| {
            MetricComparison {
                metric: metric.to_string(),
                home: home_fmt,
                away: away_fmt,
                advantage,
            }
        };
        let yes_no = |b: bool| if b { "Yes" } else { "No" }.to_string();

        let mut stats: Vec<MetricComparison> = [
            (Metric::OffRtg, "Off Rating"),
            (Metric::EfgPct, "eFG%"),
            (Metric::TovPct, "TOV%"),
            (Metric::OrbPct, "ORB%"),
        ]
        .into_iter()
        .map(|(metric, label)| {
            let pair = f.get(metric);
            let fmt = |v: f64| match metric {
                Metric::OffRtg => format!("{:.1}", v),
                _ => format!("{:.1}%", v),
            };
            row(
                label,
                fmt(pair.home),
                fmt(pair.away),
                Advantage::between(pair.home, pair.away, metric == Metric::TovPct),
            )
        })
        .collect();
        stats.extend([
            row(
                "Injury Impact",
                home_injuries.band().to_string(),
                away_injuries.band().to_string(),
                Advantage::between(home_injuries.value, away_injuries.value, false),
            ),
            // Playing on the second night of a back-to-back is the disadvantage
            row(
                "Back-to-Back",
                yes_no(home_b2b),
                yes_no(away_b2b),
                match (home_b2b, away_b2b) {
                    (true, false) => Advantage::Away,
                    (false, true) => Advantage::Home,
                    _ => Advantage::Even,
                },
            ),
        ]);

        Ok(TeamComparison {
            home_team: home.to_string(),
            away_team: away.to_string(),
            prediction_date: date,
            stats,
            breakdown: Breakdown {
                home: SideBreakdown {
                    off_rtg: f.off_rtg.home,
                    efg_pct: f.efg_pct.home,
                    tov_pct: f.tov_pct.home,
                    orb_pct: f.orb_pct.home,
                },
                away: SideBreakdown {
                    off_rtg: f.off_rtg.away,
                    efg_pct: f.efg_pct.away,
                    tov_pct: f.tov_pct.away,
                    orb_pct: f.orb_pct.away,
                },
            },
        })
    }

    pub fn invalidate_injury_cache(&self) {
        self.cache.invalidate_injuries();
    }

    pub fn model_info(&self) -> ModelInfo {
        self.classifier.info()
    }

    /// (stats, injuries) entry counts.
    pub fn cache_sizes(&self) -> (usize, usize) {
        (self.cache.stats_len(), self.cache.injuries_len())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{BrokenClassifier, MockRosters};
    use super::*;
    use crate::cache::PredictionCache;
    use crate::db::test_support::{day, flat_line, record};
    use crate::db::Database;
    use crate::features::window::test_support::MockStore;
    use crate::features::Feature;
    use crate::model::test_support::stump_artifact;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn predictor_with(store: Arc<dyn StatsStore>, rosters: Arc<MockRosters>) -> Predictor {
        Predictor::new(
            store,
            rosters,
            Arc::new(stump_artifact(104.0)),
            PredictionCache::new(64),
        )
    }

    /// Boston's last 7 days average 110 ORtg and its 30-day average is 108;
    /// Miami and every opponent sit at a flat 100.
    fn seeded_db(date: NaiveDate) -> Database {
        let db = Database::open(":memory:").unwrap();
        let older = 2470.0 / 23.0;
        for i in 1..=39 {
            let d = date - Duration::days(i);
            let boston = match i {
                1..=7 => Some(110.0),
                8..=30 => Some(older),
                37..=39 => Some(110.0),
                _ => None,
            };
            if let Some(v) = boston {
                db.insert_game(&record(d, "Boston", "Chicago", flat_line(v, 100.0))).unwrap();
            }
            db.insert_game(&record(d, "Miami", "Denver", flat_line(100.0, 100.0))).unwrap();
        }
        db
    }

    #[test]
    fn composed_home_ortg_matches_blend() {
        let date = day(DEFAULT_DATE);
        let predictor = predictor_with(Arc::new(seeded_db(date)), Arc::new(MockRosters::default()));

        let v = predictor.feature_vector(date, "Boston", "Miami").unwrap();
        // ((108 + 100) / 2 + (110 + 100) / 2) / 2
        assert_relative_eq!(v.get(Feature::HomeOrtg), 104.5, epsilon = 1e-6);
        assert_relative_eq!(v.get(Feature::AwayOrtg), 100.0, epsilon = 1e-6);
        assert_relative_eq!(v.get(Feature::HomeOrb), 104.5, epsilon = 1e-6);
    }

    #[test]
    fn injury_features_subtract_inactive_player() {
        let date = day(DEFAULT_DATE);
        let predictor = predictor_with(Arc::new(seeded_db(date)), Arc::new(MockRosters::default()));
        let v = predictor.feature_vector(date, "Boston", "Miami").unwrap();
        // Alpha: 24 + 6 + 3 + 2 + 1 = 36; Beta is out
        assert_relative_eq!(v.get(Feature::HomeInjuryValue), 36.0, epsilon = 1e-9);
        assert_relative_eq!(v.get(Feature::AwayInjuryAdvanced), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn predict_returns_one_of_the_teams() {
        let date = day(DEFAULT_DATE);
        let predictor = predictor_with(Arc::new(seeded_db(date)), Arc::new(MockRosters::default()));

        let p = predictor.predict("Boston", "Miami", None).unwrap();
        assert_eq!(p.winner, "Boston");
        assert_relative_eq!(p.confidence, 0.8, epsilon = 1e-12);
        assert_eq!(p.prediction_date, date);

        let p = predictor.predict("Miami", "Boston", Some("2025-04-14")).unwrap();
        assert_eq!(p.winner, "Boston");
        assert!((0.5..=1.0).contains(&p.confidence));
    }

    #[test]
    fn invalid_team_fails_before_any_lookup() {
        let store = Arc::new(MockStore::default());
        let rosters = Arc::new(MockRosters::default());
        let predictor = predictor_with(store.clone(), rosters.clone());

        let err = predictor.predict("Springfield", "Boston", None).unwrap_err();
        assert!(matches!(err, PredictError::InvalidTeam(ref t) if t == "Springfield"));
        let err = predictor.compare_teams("Boston", "Shelbyville", None).unwrap_err();
        assert!(matches!(err, PredictError::InvalidTeam(ref t) if t == "Shelbyville"));

        assert_eq!(store.call_count(), 0);
        assert_eq!(rosters.call_count(), 0);
    }

    #[test]
    fn invalid_date_fails_before_any_lookup() {
        let store = Arc::new(MockStore::default());
        let rosters = Arc::new(MockRosters::default());
        let predictor = predictor_with(store.clone(), rosters.clone());

        let err = predictor.predict("Boston", "Miami", Some("2025-13-40")).unwrap_err();
        assert!(matches!(err, PredictError::InvalidDate(ref d) if d == "2025-13-40"));
        assert!(err.is_client_error());
        assert_eq!(store.call_count(), 0);
        assert_eq!(rosters.call_count(), 0);
    }

    #[test]
    fn date_without_room_for_history_is_invalid() {
        let store = Arc::new(MockStore::default());
        let rosters = Arc::new(MockRosters::default());
        let predictor = predictor_with(store.clone(), rosters.clone());

        // Parses fine, but the 30-day window would run off the calendar
        let raw = (NaiveDate::MIN + Duration::days(4)).format("%Y-%m-%d").to_string();
        assert!(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").is_ok());
        let err = predictor.predict("Boston", "Miami", Some(&raw)).unwrap_err();
        assert!(matches!(err, PredictError::InvalidDate(ref d) if *d == raw));
        let err = predictor.compare_teams("Boston", "Miami", Some(&raw)).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(store.call_count(), 0);
        assert_eq!(rosters.call_count(), 0);
    }

    #[test]
    fn omitted_date_uses_default() {
        let predictor =
            predictor_with(Arc::new(MockStore::default()), Arc::new(MockRosters::default()));
        assert_eq!(predictor.validate("Boston", "Miami", None).unwrap(), day("2025-04-14"));
    }

    #[test]
    fn cached_features_survive_store_mutation() {
        let date = day(DEFAULT_DATE);
        let db = seeded_db(date);
        let predictor = predictor_with(Arc::new(db.clone()), Arc::new(MockRosters::default()));

        let before = predictor.feature_vector(date, "Boston", "Miami").unwrap();
        for i in 1..=7 {
            let d = date - Duration::days(i);
            db.insert_game(&record(d, "Boston", "Chicago", flat_line(140.0, 80.0))).unwrap();
        }
        let after = predictor.feature_vector(date, "Boston", "Miami").unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn injury_lookups_are_cached_until_invalidated() {
        let date = day(DEFAULT_DATE);
        let rosters = Arc::new(MockRosters::default());
        let predictor = predictor_with(Arc::new(seeded_db(date)), rosters.clone());

        predictor.predict("Boston", "Miami", None).unwrap();
        predictor.predict("Boston", "Miami", None).unwrap();
        assert_eq!(rosters.call_count(), 2);

        assert_eq!(predictor.cache_sizes(), (1, 2));

        predictor.invalidate_injury_cache();
        assert_eq!(predictor.cache_sizes(), (1, 0));
        predictor.predict("Boston", "Miami", None).unwrap();
        assert_eq!(rosters.call_count(), 4);
    }

    #[test]
    fn roster_failure_is_data_unavailable() {
        let date = day(DEFAULT_DATE);
        let rosters = Arc::new(MockRosters { fail: true, ..MockRosters::default() });
        let predictor = predictor_with(Arc::new(seeded_db(date)), rosters);
        let err = predictor.predict("Boston", "Miami", None).unwrap_err();
        assert!(matches!(err, PredictError::DataUnavailable(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn classifier_failure_propagates() {
        let predictor = Predictor::new(
            Arc::new(MockStore::default()),
            Arc::new(MockRosters::default()),
            Arc::new(BrokenClassifier),
            PredictionCache::new(4),
        );
        let err = predictor.predict("Boston", "Miami", None).unwrap_err();
        assert!(matches!(err, PredictError::Classifier(_)));
    }

    #[test]
    fn comparison_is_symmetric() {
        let date = day(DEFAULT_DATE);
        let predictor = predictor_with(Arc::new(seeded_db(date)), Arc::new(MockRosters::default()));

        let ab = predictor.compare_teams("Boston", "Miami", None).unwrap();
        let ba = predictor.compare_teams("Miami", "Boston", None).unwrap();
        assert_eq!(ab.breakdown.home, ba.breakdown.away);
        assert_eq!(ab.breakdown.away, ba.breakdown.home);
        for (x, y) in ab.stats.iter().zip(&ba.stats) {
            assert_eq!(x.home, y.away);
            assert_eq!(x.away, y.home);
        }
    }

    #[test]
    fn comparison_rows_and_advantages() {
        let date = day(DEFAULT_DATE);
        let predictor = predictor_with(Arc::new(seeded_db(date)), Arc::new(MockRosters::default()));

        let cmp = predictor.compare_teams("Boston", "Miami", None).unwrap();
        let metrics: Vec<&str> = cmp.stats.iter().map(|s| s.metric.as_str()).collect();
        assert_eq!(
            metrics,
            vec!["Off Rating", "eFG%", "TOV%", "ORB%", "Injury Impact", "Back-to-Back"]
        );
        assert_eq!(cmp.stats[0].home, "104.5");
        assert_eq!(cmp.stats[0].advantage, Advantage::Home);
        // Higher TOV% is worse
        assert_eq!(cmp.stats[2].advantage, Advantage::Away);
        assert_eq!(cmp.stats[4].home, "Medium");
        assert_eq!(cmp.stats[4].advantage, Advantage::Even);
        // Both played the night before
        assert_eq!(cmp.stats[5].home, "Yes");
        assert_eq!(cmp.stats[5].advantage, Advantage::Even);
    }

    #[test]
    fn advantage_tolerance_band() {
        assert_eq!(Advantage::between(100.0, 100.05, false), Advantage::Even);
        assert_eq!(Advantage::between(100.0, 100.2, false), Advantage::Away);
        assert_eq!(Advantage::between(12.0, 14.0, true), Advantage::Home);
    }

    #[test]
    fn recorded_winner_from_store() {
        let date = day(DEFAULT_DATE);
        let db = seeded_db(date);
        let predictor = predictor_with(Arc::new(db), Arc::new(MockRosters::default()));
        let d = date - Duration::days(1);
        // flat_line(110, 100): home scored 110, away 100
        assert_eq!(
            predictor.recorded_winner("Boston", "Chicago", d).unwrap(),
            Some("Boston".to_string())
        );
        assert_eq!(predictor.recorded_winner("Boston", "Miami", d).unwrap(), None);
    }
}
