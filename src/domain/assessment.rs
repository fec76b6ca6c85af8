//! Risk assessment result types.
//!
//! Represents the output of one prediction: hard label, probability,
//! ranked feature attributions, and the optional model-generated explanation.

use serde::{Deserialize, Serialize};

/// Binary risk classification produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// No heart disease predicted
    Low,
    /// Heart disease predicted
    High,
}

impl RiskLabel {
    /// Map the classifier's hard label (0/1) to a risk label.
    #[must_use]
    pub fn from_prediction(prediction: u8) -> Self {
        if prediction == 1 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::High => "High risk - Clinical consultation advised",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::High => write!(f, "HIGH RISK"),
        }
    }
}

/// A signed per-feature contribution to one prediction.
///
/// Positive values push the prediction toward the positive (disease) class,
/// negative values away from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Feature name from the training schema
    pub feature: String,

    /// Signed attribution value
    pub value: f64,
}

impl Attribution {
    #[must_use]
    pub fn new(feature: impl Into<String>, value: f64) -> Self {
        Self {
            feature: feature.into(),
            value,
        }
    }

    /// Whether this feature pushed the prediction toward the disease class.
    #[must_use]
    pub fn is_risk_increasing(&self) -> bool {
        self.value > 0.0
    }

    /// Direction annotation used in the result view and the prompt.
    #[must_use]
    pub fn direction_label(&self) -> &'static str {
        if self.is_risk_increasing() {
            "↑ Increased risk"
        } else {
            "↓ Decreased risk"
        }
    }
}

/// Raw classifier output (before interpretation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Positive-class probability (0.0 to 1.0)
    pub probability: f64,

    /// Hard label (0 = no disease, 1 = disease present)
    pub prediction: u8,
}

impl ModelOutput {
    /// Create a model output by thresholding the probability.
    #[must_use]
    pub fn new(probability: f64, threshold: f64) -> Self {
        let prediction = u8::from(probability >= threshold);
        Self {
            probability,
            prediction,
        }
    }

    /// Confidence in the hard label (distance from the opposite class).
    #[must_use]
    pub fn confidence(&self) -> f64 {
        if self.prediction == 1 {
            self.probability
        } else {
            1.0 - self.probability
        }
    }
}

/// Complete assessment record for one prediction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Unique identifier
    pub id: String,

    /// Reference to patient (if available)
    pub patient_id: Option<String>,

    /// The classifier output
    pub output: ModelOutput,

    /// Risk classification
    pub label: RiskLabel,

    /// Top contributing features, ordered by descending absolute attribution
    pub top_features: Vec<Attribution>,

    /// Model-generated explanation; `None` when the chat model was unavailable
    pub explanation: Option<String>,

    /// Timestamp of assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Create a new assessment from a classifier output.
    #[must_use]
    pub fn new(
        output: ModelOutput,
        top_features: Vec<Attribution>,
        explanation: Option<String>,
    ) -> Self {
        Self {
            id: uuid_v4(),
            patient_id: None,
            label: RiskLabel::from_prediction(output.prediction),
            output,
            top_features,
            explanation,
            created_at: chrono::Utc::now(),
        }
    }

    /// Attach a patient reference.
    #[must_use]
    pub fn with_patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }
}

/// Generate a simple UUID v4 (random) using a CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy so identifiers are unpredictable
/// on all platforms.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_prediction() {
        assert_eq!(RiskLabel::from_prediction(0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_prediction(1), RiskLabel::High);
    }

    #[test]
    fn test_model_output_thresholding() {
        let low = ModelOutput::new(0.3, 0.5);
        assert_eq!(low.prediction, 0);
        assert!((low.confidence() - 0.7).abs() < 1e-12);

        let high = ModelOutput::new(0.75, 0.5);
        assert_eq!(high.prediction, 1);
        assert!((high.confidence() - 0.75).abs() < 1e-12);

        // Exactly at the threshold counts as positive.
        assert_eq!(ModelOutput::new(0.5, 0.5).prediction, 1);
    }

    #[test]
    fn test_attribution_direction() {
        assert!(Attribution::new("oldpeak", 0.4).is_risk_increasing());
        assert!(!Attribution::new("max heart rate", -0.2).is_risk_increasing());
        assert_eq!(
            Attribution::new("ST slope", -0.1).direction_label(),
            "↓ Decreased risk"
        );
    }

    #[test]
    fn test_assessment_creation() {
        let output = ModelOutput::new(0.8, 0.5);
        let assessment = Assessment::new(output, vec![], None).with_patient("p-1");

        assert_eq!(assessment.label, RiskLabel::High);
        assert_eq!(assessment.patient_id.as_deref(), Some("p-1"));
        assert!(assessment.explanation.is_none());
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID format with dashes
    }
}
