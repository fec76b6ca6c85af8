//! Assessment service: orchestrates the prediction pipeline.
//!
//! One call runs the full flow for a single patient record:
//! - scale the raw feature row with the fitted scaler
//! - obtain hard label and positive-class probability from the classifier
//! - compute per-feature attributions on the scaled row
//! - keep the top three by absolute magnitude (stable order on ties)
//! - ask the explanation model for a short text summary
//!
//! The explanation step degrades gracefully: a failed or timed-out chat call
//! yields an assessment without explanation text, never a failed assessment.

use std::sync::Arc;

use crate::domain::{Assessment, Attribution, PatientData, RiskLabel, FEATURE_NAMES};
use crate::ports::{AttributionExplainer, ExplanationModel, RiskModel};
use crate::CardioLensError;

/// Select the top `k` attributions by descending absolute value.
///
/// Sorting is stable, so equal magnitudes keep their feature (input) order.
#[must_use]
pub fn top_attributions(values: &[f64], k: usize) -> Vec<Attribution> {
    let mut ranked: Vec<Attribution> = FEATURE_NAMES
        .iter()
        .zip(values)
        .map(|(name, value)| Attribution::new(*name, *value))
        .collect();

    ranked.sort_by(|a, b| {
        b.value
            .abs()
            .partial_cmp(&a.value.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(k);
    ranked
}

/// Service for running the prediction pipeline.
///
/// Artifacts are loaded once per process; the service itself is stateless
/// and shared behind `Arc` between the TUI thread and worker threads.
pub struct AssessmentService<M, A, L>
where
    M: RiskModel,
    A: AttributionExplainer,
    L: ExplanationModel,
{
    model: Arc<M>,
    explainer: Arc<A>,
    language: Arc<L>,
}

impl<M, A, L> AssessmentService<M, A, L>
where
    M: RiskModel,
    A: AttributionExplainer,
    L: ExplanationModel,
{
    /// Create a new assessment service.
    pub fn new(model: Arc<M>, explainer: Arc<A>, language: Arc<L>) -> Self {
        Self {
            model,
            explainer,
            language,
        }
    }

    /// Run the full assessment pipeline for one patient record.
    ///
    /// Deterministic for fixed input and fixed artifacts, apart from the
    /// generated explanation text.
    ///
    /// # Errors
    /// Returns error on invalid features or a model evaluation failure.
    pub fn assess(&self, patient: &PatientData) -> Result<Assessment, CardioLensError> {
        if let Err(errors) = patient.features.validate() {
            return Err(CardioLensError::Validation(errors.join(", ")));
        }

        tracing::info!("Starting assessment pipeline...");

        let raw = patient.features.to_vec();
        let scaled = self.model.scale(&raw)?;
        let output = self.model.classify(&scaled)?;

        let values = self.explainer.attributions(&scaled)?;
        let top = top_attributions(&values, 3);

        let label = RiskLabel::from_prediction(output.prediction);
        let explanation = match self.language.summarize(label, output.probability, &top) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Explanation unavailable: {e}");
                None
            }
        };

        let mut assessment = Assessment::new(output, top, explanation);
        if let Some(patient_id) = &patient.id {
            assessment = assessment.with_patient(patient_id.clone());
        }

        tracing::info!(
            prediction = assessment.output.prediction,
            probability = format!("{:.3}", assessment.output.probability),
            label = %assessment.label,
            explained = assessment.explanation.is_some(),
            "Assessment complete"
        );

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::tests::test_artifacts;
    use crate::adapters::ModelArtifacts;
    use crate::domain::{ChestPainType, PatientFeatures, RestingEcg, Sex, StSlope};
    use crate::ports::ExplanationError;

    struct FixedExplanation(&'static str);

    impl ExplanationModel for FixedExplanation {
        fn summarize(
            &self,
            _label: RiskLabel,
            _probability: f64,
            _top: &[Attribution],
        ) -> Result<String, ExplanationError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingExplanation;

    impl ExplanationModel for FailingExplanation {
        fn summarize(
            &self,
            _label: RiskLabel,
            _probability: f64,
            _top: &[Attribution],
        ) -> Result<String, ExplanationError> {
            Err(ExplanationError::Request("connection refused".to_string()))
        }
    }

    fn service_with<L: ExplanationModel>(
        language: L,
    ) -> AssessmentService<ModelArtifacts, ModelArtifacts, L> {
        let artifacts = Arc::new(test_artifacts());
        AssessmentService::new(artifacts.clone(), artifacts, Arc::new(language))
    }

    /// The example record from the input form defaults.
    fn example_patient() -> PatientData {
        PatientData::new(PatientFeatures {
            age: 50.0,
            sex: Sex::Male,
            chest_pain_type: ChestPainType::Asymptomatic,
            resting_bp_s: 120.0,
            cholesterol: 200.0,
            fasting_blood_sugar: false,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 150.0,
            exercise_angina: false,
            oldpeak: 1.0,
            st_slope: StSlope::Flat,
        })
    }

    #[test]
    fn test_end_to_end_assessment() {
        let service = service_with(FixedExplanation("Elevated ST-slope contribution."));
        let assessment = service.assess(&example_patient()).expect("should assess");

        assert!(assessment.output.prediction == 0 || assessment.output.prediction == 1);
        assert!(assessment.output.probability >= 0.0 && assessment.output.probability <= 1.0);
        assert!(assessment.top_features.len() <= 3);
        assert_eq!(
            assessment.explanation.as_deref(),
            Some("Elevated ST-slope contribution.")
        );
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let service = service_with(FixedExplanation("stable"));
        let patient = example_patient();

        let first = service.assess(&patient).expect("should assess");
        let second = service.assess(&patient).expect("should assess");

        assert_eq!(first.output.prediction, second.output.prediction);
        assert!((first.output.probability - second.output.probability).abs() < f64::EPSILON);
        assert_eq!(first.top_features, second.top_features);
    }

    #[test]
    fn test_top_features_sorted_by_absolute_value() {
        let service = service_with(FixedExplanation(""));
        let assessment = service.assess(&example_patient()).expect("should assess");

        let magnitudes: Vec<f64> = assessment
            .top_features
            .iter()
            .map(|a| a.value.abs())
            .collect();
        for pair in magnitudes.windows(2) {
            assert!(pair[0] >= pair[1], "not sorted: {magnitudes:?}");
        }
    }

    #[test]
    fn test_explanation_failure_degrades_to_none() {
        let service = service_with(FailingExplanation);
        let assessment = service.assess(&example_patient()).expect("should assess");

        assert!(assessment.explanation.is_none());
        // The numeric result is still produced.
        assert!(assessment.output.probability >= 0.0 && assessment.output.probability <= 1.0);
    }

    #[test]
    fn test_invalid_features_rejected() {
        let service = service_with(FixedExplanation(""));
        let mut patient = example_patient();
        patient.features.age = 5.0;

        let result = service.assess(&patient);
        assert!(matches!(result, Err(CardioLensError::Validation(_))));
    }

    #[test]
    fn test_top_attributions_selection() {
        let mut values = vec![0.0; FEATURE_NAMES.len()];
        values[1] = -0.9; // sex
        values[4] = 0.5; // cholesterol
        values[7] = 0.1; // max heart rate
        values[9] = 0.3; // oldpeak

        let top = top_attributions(&values, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].feature, "sex");
        assert_eq!(top[1].feature, "cholesterol");
        assert_eq!(top[2].feature, "oldpeak");
    }

    #[test]
    fn test_top_attributions_ties_keep_input_order() {
        let mut values = vec![0.0; FEATURE_NAMES.len()];
        values[2] = 0.4; // chest pain type
        values[6] = -0.4; // resting ecg
        values[8] = 0.4; // exercise angina

        let top = top_attributions(&values, 3);
        assert_eq!(top[0].feature, "chest pain type");
        assert_eq!(top[1].feature, "resting ecg");
        assert_eq!(top[2].feature, "exercise angina");
    }

    #[test]
    fn test_top_attributions_shorter_than_k() {
        let top = top_attributions(&[0.1; 11], 3);
        assert_eq!(top.len(), 3);
        let all = top_attributions(&[0.1; 11], 20);
        assert_eq!(all.len(), 11);
    }
}
