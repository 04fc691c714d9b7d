pub mod composer;
pub mod vector;
pub mod window;

pub use composer::{compose_four_factors, FourFactors, MetricPair};
pub use vector::{Feature, FeatureVector, FEATURE_COUNT};
