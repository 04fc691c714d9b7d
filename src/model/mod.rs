use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod forest;

use crate::error::PredictError;
use crate::features::{Feature, FeatureVector, FEATURE_COUNT};
use forest::RandomForest;

/// Class label the model uses for "home team won".
pub const HOME_WIN_LABEL: i64 = 1;

/// Binary outcome plus the probability of each class, in `classes` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub home_win: bool,
    pub probabilities: [f64; 2],
}

impl Classification {
    /// Probability of the predicted class.
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }
}

/// Metadata exposed on `/api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Hold-out accuracy as a percentage, two decimals
    pub accuracy: f64,
    pub features: usize,
    pub model_type: String,
}

/// Anything that turns a feature vector into a win/loss call.
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        features: &FeatureVector,
    ) -> std::result::Result<Classification, PredictError>;

    fn info(&self) -> ModelInfo;
}

fn default_model_kind() -> String {
    "Random Forest Classifier".to_string()
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}

/// Persisted classifier: the forest plus training metadata. `accuracy`,
/// `features` and `forest` are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_model_kind")]
    pub model_kind: String,
    /// Hold-out accuracy as a fraction (0.0–1.0)
    pub accuracy: f64,
    /// Training column names, in order
    pub features: Vec<String>,
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Model file not found at {}", path))?;
        Self::from_json(&raw).with_context(|| format!("Failed to load model from {}", path))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: ModelArtifact =
            serde_json::from_str(raw).context("Malformed model artifact")?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        let expected = Feature::columns();
        if self.features != expected {
            anyhow::bail!(
                "Model feature columns {:?} do not match expected order {:?}",
                self.features,
                expected
            );
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            anyhow::bail!("Model accuracy {} outside [0, 1]", self.accuracy);
        }
        if !self.classes.contains(&HOME_WIN_LABEL) || self.classes[0] == self.classes[1] {
            anyhow::bail!(
                "Model classes {:?} must be two distinct labels including {}",
                self.classes,
                HOME_WIN_LABEL
            );
        }
        self.forest
            .validate(FEATURE_COUNT)
            .map_err(|e| anyhow::anyhow!("Invalid forest: {}", e))?;
        Ok(())
    }
}

impl Classifier for ModelArtifact {
    fn classify(
        &self,
        features: &FeatureVector,
    ) -> std::result::Result<Classification, PredictError> {
        let x = features.as_slice();
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::Classifier(format!(
                "non-finite input for '{}'",
                Feature::ORDER[i].column()
            )));
        }
        let probabilities = self.forest.predict_proba(x);
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(PredictError::Classifier("non-finite class probability".into()));
        }
        // Ties go to the first class
        let label_idx = if probabilities[1] > probabilities[0] { 1 } else { 0 };
        Ok(Classification {
            home_win: self.classes[label_idx] == HOME_WIN_LABEL,
            probabilities,
        })
    }

    fn info(&self) -> ModelInfo {
        ModelInfo {
            accuracy: (self.accuracy * 100.0 * 100.0).round() / 100.0,
            features: self.features.len(),
            model_type: self.model_kind.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::forest::{Node, RandomForest, Tree};
    use super::ModelArtifact;
    use crate::features::Feature;

    /// Single-stump forest splitting on "Home ORtg".
    pub fn stump_artifact(threshold: f64) -> ModelArtifact {
        ModelArtifact {
            model_kind: "Random Forest Classifier".into(),
            accuracy: 0.6789,
            features: Feature::columns().into_iter().map(String::from).collect(),
            classes: [0, 1],
            forest: RandomForest {
                trees: vec![Tree {
                    nodes: vec![
                        Node::Split {
                            feature: Feature::HomeOrtg.index(),
                            threshold,
                            left: 1,
                            right: 2,
                        },
                        Node::Leaf { value: [7.0, 3.0] },
                        Node::Leaf { value: [2.0, 8.0] },
                    ],
                }],
            },
        }
    }
}
