//! Model artifact adapter: fitted classifier, scaler, and attribution
//! explainer loaded from JSON export files.
//!
//! The training pipeline exports three files into the model directory:
//! - `classifier.json`: logistic model (feature names, coefficients, intercept)
//! - `scaler.json`: standard-scaler parameters (per-feature mean and std)
//! - `explainer.json`: linear attribution explainer (expected value and
//!   background row in scaled space)
//!
//! # Schema validation
//!
//! Each artifact carries its own feature-name list. All three are validated
//! at load time against the canonical schema in [`crate::domain::FEATURE_NAMES`],
//! in name and order. A divergent artifact would silently attribute values to
//! the wrong features, so a mismatch is a hard load error rather than a
//! latent bug.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ModelOutput, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{AttributionExplainer, ModelError, RiskModel};

/// File names expected inside the model directory.
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const EXPLAINER_FILE: &str = "explainer.json";

/// Errors while loading or validating model artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    Missing(PathBuf),

    #[error("Failed to read {file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {file}: {source}")]
    Parse {
        file: String,
        source: serde_json::Error,
    },

    #[error("Schema mismatch in {file}: {detail}")]
    SchemaMismatch { file: String, detail: String },
}

/// Logistic classifier parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Standard-scaler parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

/// Linear attribution explainer exported by the training pipeline.
///
/// For a linear model the exact attribution of feature `i` on a scaled row
/// `x` is `coef[i] * (x[i] - background[i])`, and the contributions plus the
/// expected value sum to the model's logit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainerArtifact {
    pub feature_names: Vec<String>,
    pub expected_value: f64,
    pub background: Vec<f64>,
}

/// The three fitted artifacts, loaded once per process and shared read-only.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    classifier: ClassifierArtifact,
    scaler: ScalerArtifact,
    explainer: ExplainerArtifact,
}

impl ModelArtifacts {
    /// Load and validate all three artifacts from a model directory.
    ///
    /// # Errors
    /// Returns error if a file is missing, unreadable, unparsable, or its
    /// feature schema diverges from the canonical one.
    pub fn load(model_dir: &Path) -> Result<Self, ArtifactError> {
        if !model_dir.is_dir() {
            return Err(ArtifactError::Missing(model_dir.to_path_buf()));
        }

        let classifier: ClassifierArtifact = read_artifact(model_dir, CLASSIFIER_FILE)?;
        let scaler: ScalerArtifact = read_artifact(model_dir, SCALER_FILE)?;
        let explainer: ExplainerArtifact = read_artifact(model_dir, EXPLAINER_FILE)?;

        let artifacts = Self::from_parts(classifier, scaler, explainer)?;

        tracing::info!(
            dir = %model_dir.display(),
            features = FEATURE_COUNT,
            threshold = artifacts.classifier.threshold,
            "Model artifacts loaded"
        );

        Ok(artifacts)
    }

    /// Assemble artifacts from already-deserialized parts, validating the
    /// shared feature schema.
    ///
    /// # Errors
    /// Returns `ArtifactError::SchemaMismatch` on any divergence.
    pub fn from_parts(
        classifier: ClassifierArtifact,
        scaler: ScalerArtifact,
        explainer: ExplainerArtifact,
    ) -> Result<Self, ArtifactError> {
        validate_names(CLASSIFIER_FILE, &classifier.feature_names)?;
        validate_len(CLASSIFIER_FILE, "coefficients", classifier.coefficients.len())?;

        validate_names(SCALER_FILE, &scaler.feature_names)?;
        validate_len(SCALER_FILE, "mean", scaler.mean.len())?;
        validate_len(SCALER_FILE, "std", scaler.std.len())?;
        for (name, std) in FEATURE_NAMES.iter().zip(&scaler.std) {
            if !std.is_finite() || *std <= 0.0 {
                return Err(ArtifactError::SchemaMismatch {
                    file: SCALER_FILE.to_string(),
                    detail: format!("std for '{name}' must be finite and positive, got {std}"),
                });
            }
        }

        validate_names(EXPLAINER_FILE, &explainer.feature_names)?;
        validate_len(EXPLAINER_FILE, "background", explainer.background.len())?;

        Ok(Self {
            classifier,
            scaler,
            explainer,
        })
    }

    /// Decision threshold the classifier was calibrated for.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.classifier.threshold
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(
    dir: &Path,
    file: &str,
) -> Result<T, ArtifactError> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(ArtifactError::Missing(path));
    }
    let content = fs::read_to_string(&path).map_err(|source| ArtifactError::Read {
        file: file.to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        file: file.to_string(),
        source,
    })
}

fn validate_names(file: &str, names: &[String]) -> Result<(), ArtifactError> {
    if names.len() != FEATURE_COUNT {
        return Err(ArtifactError::SchemaMismatch {
            file: file.to_string(),
            detail: format!("expected {FEATURE_COUNT} feature names, got {}", names.len()),
        });
    }
    for (i, (got, expected)) in names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
        if got != expected {
            return Err(ArtifactError::SchemaMismatch {
                file: file.to_string(),
                detail: format!("feature {i} is '{got}', expected '{expected}'"),
            });
        }
    }
    Ok(())
}

fn validate_len(file: &str, field: &str, len: usize) -> Result<(), ArtifactError> {
    if len != FEATURE_COUNT {
        return Err(ArtifactError::SchemaMismatch {
            file: file.to_string(),
            detail: format!("'{field}' has {len} entries, expected {FEATURE_COUNT}"),
        });
    }
    Ok(())
}

fn check_row(row: &[f64]) -> Result<(), ModelError> {
    if row.len() != FEATURE_COUNT {
        return Err(ModelError::FeatureCount {
            expected: FEATURE_COUNT,
            got: row.len(),
        });
    }
    for (value, name) in row.iter().zip(FEATURE_NAMES.iter()) {
        if !value.is_finite() {
            return Err(ModelError::NonFinite((*name).to_string()));
        }
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskModel for ModelArtifacts {
    fn scale(&self, raw: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_row(raw)?;
        Ok(raw
            .iter()
            .zip(self.scaler.mean.iter().zip(&self.scaler.std))
            .map(|(x, (mean, std))| (x - mean) / std)
            .collect())
    }

    fn classify(&self, scaled: &[f64]) -> Result<ModelOutput, ModelError> {
        check_row(scaled)?;
        let logit: f64 = self.classifier.intercept
            + scaled
                .iter()
                .zip(&self.classifier.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        Ok(ModelOutput::new(sigmoid(logit), self.classifier.threshold))
    }
}

impl AttributionExplainer for ModelArtifacts {
    fn attributions(&self, scaled: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_row(scaled)?;
        Ok(scaled
            .iter()
            .zip(self.explainer.background.iter())
            .zip(&self.classifier.coefficients)
            .map(|((x, bg), w)| w * (x - bg))
            .collect())
    }

    fn expected_value(&self) -> f64 {
        self.explainer.expected_value
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    }

    pub(crate) fn test_artifacts() -> ModelArtifacts {
        let classifier = ClassifierArtifact {
            feature_names: names(),
            coefficients: vec![0.22, 0.45, 0.58, 0.18, 0.12, 0.16, 0.1, -0.38, 0.52, 0.47, 0.6],
            intercept: 0.08,
            threshold: 0.5,
        };
        let scaler = ScalerArtifact {
            feature_names: names(),
            mean: vec![
                53.72, 0.76, 2.25, 132.4, 210.4, 0.21, 0.7, 138.7, 0.39, 0.89, 1.62,
            ],
            std: vec![
                9.36, 0.43, 0.93, 18.0, 101.4, 0.41, 0.87, 25.5, 0.49, 1.07, 0.61,
            ],
        };
        let explainer = ExplainerArtifact {
            feature_names: names(),
            expected_value: 0.08,
            background: vec![0.0; FEATURE_COUNT],
        };
        ModelArtifacts::from_parts(classifier, scaler, explainer).expect("valid test artifacts")
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = test_artifacts();

        for (file, json) in [
            (
                CLASSIFIER_FILE,
                serde_json::to_string(&source.classifier).expect("serialize"),
            ),
            (
                SCALER_FILE,
                serde_json::to_string(&source.scaler).expect("serialize"),
            ),
            (
                EXPLAINER_FILE,
                serde_json::to_string(&source.explainer).expect("serialize"),
            ),
        ] {
            let mut f = std::fs::File::create(dir.path().join(file)).expect("create");
            f.write_all(json.as_bytes()).expect("write");
        }

        let loaded = ModelArtifacts::load(dir.path()).expect("should load");
        assert!((loaded.threshold() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = ModelArtifacts::load(dir.path());
        assert!(matches!(result, Err(ArtifactError::Missing(_))));
    }

    #[test]
    fn test_reordered_feature_names_rejected() {
        let mut shuffled = names();
        shuffled.swap(0, 10);

        let classifier = ClassifierArtifact {
            feature_names: shuffled,
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept: 0.0,
            threshold: 0.5,
        };
        let base = test_artifacts();
        let result = ModelArtifacts::from_parts(classifier, base.scaler, base.explainer);

        assert!(matches!(
            result,
            Err(ArtifactError::SchemaMismatch { ref file, .. }) if file == CLASSIFIER_FILE
        ));
    }

    #[test]
    fn test_zero_std_rejected() {
        let base = test_artifacts();
        let mut scaler = base.scaler.clone();
        scaler.std[3] = 0.0;

        let result = ModelArtifacts::from_parts(base.classifier, scaler, base.explainer);
        assert!(matches!(
            result,
            Err(ArtifactError::SchemaMismatch { ref file, .. }) if file == SCALER_FILE
        ));
    }

    #[test]
    fn test_scaling_arithmetic() {
        let artifacts = test_artifacts();
        let raw = vec![53.72, 0.76, 2.25, 132.4, 210.4, 0.21, 0.7, 138.7, 0.39, 0.89, 1.62];

        let scaled = artifacts.scale(&raw).expect("scale");
        for value in &scaled {
            assert!(value.abs() < 1e-9, "mean row should scale to zero");
        }

        assert_eq!(
            artifacts.scale(&raw[..5]),
            Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                got: 5
            })
        );
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let artifacts = test_artifacts();
        for magnitude in [-50.0, -1.0, 0.0, 1.0, 50.0] {
            let row = vec![magnitude; FEATURE_COUNT];
            let output = artifacts.classify(&row).expect("classify");
            assert!(output.probability >= 0.0 && output.probability <= 1.0);
            assert!(output.prediction == 0 || output.prediction == 1);
        }
    }

    #[test]
    fn test_attribution_additivity() {
        let artifacts = test_artifacts();
        let scaled = vec![0.5, -1.2, 0.8, 0.0, 1.5, -0.3, 0.2, -0.9, 1.1, 0.4, -0.6];

        let values = artifacts.attributions(&scaled).expect("attributions");
        let reconstructed: f64 = artifacts.expected_value() + values.iter().sum::<f64>();

        let logit = artifacts.classifier.intercept
            + scaled
                .iter()
                .zip(&artifacts.classifier.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        assert!((reconstructed - logit).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let artifacts = test_artifacts();
        let mut row = vec![0.0; FEATURE_COUNT];
        row[4] = f64::NAN;

        assert_eq!(
            artifacts.classify(&row),
            Err(ModelError::NonFinite("cholesterol".to_string()))
        );
    }
}
