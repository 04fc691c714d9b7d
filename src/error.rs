use thiserror::Error;

/// Errors surfaced by the prediction core.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Invalid team: {0}. Must be a valid NBA city name.")]
    InvalidTeam(String),

    #[error("Invalid date '{0}': must be a YYYY-MM-DD date within the supported range")]
    InvalidDate(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Classifier failed: {0}")]
    Classifier(String),
}

impl PredictError {
    /// Validation failures caused by the request itself (4xx); everything
    /// else is an internal failure (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::InvalidTeam(_) | PredictError::InvalidDate(_))
    }

    pub fn data_unavailable(err: impl std::fmt::Display) -> Self {
        PredictError::DataUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
