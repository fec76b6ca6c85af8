//! Model ports: Traits for the pre-trained classifier, scaler, and explainer.
//!
//! These traits abstract the serialized model artifacts from the application
//! logic. All operations work on a single feature row in training order.

use thiserror::Error;

use crate::domain::ModelOutput;

/// Errors during model evaluation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Non-finite value for feature '{0}'")]
    NonFinite(String),
}

/// Trait for the fitted scaler and classifier pair.
///
/// Implementations hold artifacts that were fitted together; `classify`
/// expects a row already transformed by `scale`.
pub trait RiskModel: Send + Sync {
    /// Transform a raw feature row into the space the classifier was
    /// trained on.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` on a row of the wrong length.
    fn scale(&self, raw: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Hard label and positive-class probability for a scaled row.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` on a row of the wrong length.
    fn classify(&self, scaled: &[f64]) -> Result<ModelOutput, ModelError>;
}

/// Trait for the fitted attribution explainer.
pub trait AttributionExplainer: Send + Sync {
    /// Signed per-feature contributions for one scaled row, in training
    /// order. Positive values push toward the positive class.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` on a row of the wrong length.
    fn attributions(&self, scaled: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// The explainer's expected value (model output over the background).
    fn expected_value(&self) -> f64;
}
