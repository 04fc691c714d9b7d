//! The classifier's input columns.
//!
//! The model was trained on exactly these twelve columns in exactly this
//! order. `FeatureVector` is indexed by `Feature` so the order lives in one
//! place; the model loader rejects artifacts whose feature list differs.

use super::composer::FourFactors;
use crate::roster::InjuryImpact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    HomeOrtg,
    AwayOrtg,
    HomeEfg,
    AwayEfg,
    HomeTov,
    AwayTov,
    HomeOrb,
    AwayOrb,
    HomeInjuryValue,
    AwayInjuryValue,
    HomeInjuryAdvanced,
    AwayInjuryAdvanced,
}

pub const FEATURE_COUNT: usize = 12;

impl Feature {
    pub const ORDER: [Feature; FEATURE_COUNT] = [
        Feature::HomeOrtg,
        Feature::AwayOrtg,
        Feature::HomeEfg,
        Feature::AwayEfg,
        Feature::HomeTov,
        Feature::AwayTov,
        Feature::HomeOrb,
        Feature::AwayOrb,
        Feature::HomeInjuryValue,
        Feature::AwayInjuryValue,
        Feature::HomeInjuryAdvanced,
        Feature::AwayInjuryAdvanced,
    ];

    /// Column name the model was trained with.
    pub fn column(self) -> &'static str {
        match self {
            Feature::HomeOrtg => "Home ORtg",
            Feature::AwayOrtg => "Away ORtg",
            Feature::HomeEfg => "Home eFG%",
            Feature::AwayEfg => "Away eFG%",
            Feature::HomeTov => "Home TOV%",
            Feature::AwayTov => "Away TOV%",
            Feature::HomeOrb => "Home ORB%",
            Feature::AwayOrb => "Away ORB%",
            Feature::HomeInjuryValue => "Home Injury Value",
            Feature::AwayInjuryValue => "Away Injury Value",
            Feature::HomeInjuryAdvanced => "Home Injury Advanced",
            Feature::AwayInjuryAdvanced => "Away Injury Advanced",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn columns() -> Vec<&'static str> {
        Self::ORDER.iter().map(|f| f.column()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn assemble(factors: &FourFactors, home: &InjuryImpact, away: &InjuryImpact) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        let mut put = |feature: Feature, value: f64| values[feature.index()] = value;
        put(Feature::HomeOrtg, factors.off_rtg.home);
        put(Feature::AwayOrtg, factors.off_rtg.away);
        put(Feature::HomeEfg, factors.efg_pct.home);
        put(Feature::AwayEfg, factors.efg_pct.away);
        put(Feature::HomeTov, factors.tov_pct.home);
        put(Feature::AwayTov, factors.tov_pct.away);
        put(Feature::HomeOrb, factors.orb_pct.home);
        put(Feature::AwayOrb, factors.orb_pct.away);
        put(Feature::HomeInjuryValue, home.value);
        put(Feature::AwayInjuryValue, away.value);
        put(Feature::HomeInjuryAdvanced, home.advanced);
        put(Feature::AwayInjuryAdvanced, away.advanced);
        FeatureVector(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::composer::MetricPair;

    #[test]
    fn order_matches_training_columns() {
        assert_eq!(
            Feature::columns(),
            vec![
                "Home ORtg",
                "Away ORtg",
                "Home eFG%",
                "Away eFG%",
                "Home TOV%",
                "Away TOV%",
                "Home ORB%",
                "Away ORB%",
                "Home Injury Value",
                "Away Injury Value",
                "Home Injury Advanced",
                "Away Injury Advanced",
            ]
        );
        for (i, feature) in Feature::ORDER.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn assemble_places_each_value_in_its_column() {
        let factors = FourFactors {
            off_rtg: MetricPair { home: 1.0, away: 2.0 },
            efg_pct: MetricPair { home: 3.0, away: 4.0 },
            tov_pct: MetricPair { home: 5.0, away: 6.0 },
            orb_pct: MetricPair { home: 7.0, away: 8.0 },
        };
        let home = InjuryImpact { value: 9.0, advanced: 11.0, inactive: vec![] };
        let away = InjuryImpact { value: 10.0, advanced: 12.0, inactive: vec![] };
        let v = FeatureVector::assemble(&factors, &home, &away);
        let expected: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        assert_eq!(v.as_slice(), expected.as_slice());
        assert_eq!(v.get(Feature::AwayInjuryAdvanced), 12.0);
    }
}
