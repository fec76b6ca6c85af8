//! Patient data types for heart-disease risk prediction.
//!
//! Features follow the combined heart-disease dataset schema the classifier
//! was trained on. Categorical fields are encoded by declaration order, which
//! must not be reordered: the encoding is part of the model contract.

use serde::{Deserialize, Serialize};

/// Number of clinical features the model consumes.
pub const FEATURE_COUNT: usize = 11;

/// Feature names in training order. The classifier, scaler, and explainer
/// artifacts are validated against this list at load time.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "sex",
    "chest pain type",
    "resting bp s",
    "cholesterol",
    "fasting blood sugar",
    "resting ecg",
    "max heart rate",
    "exercise angina",
    "oldpeak",
    "ST slope",
];

/// Patient sex. Encoded Female = 0, Male = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    Female,
    #[default]
    Male,
}

impl Sex {
    pub const LABELS: [&'static str; 2] = ["Female", "Male"];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::Female),
            1 => Some(Self::Male),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// Chest pain category, encoded by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChestPainType {
    #[default]
    TypicalAngina,
    AtypicalAngina,
    NonAnginalPain,
    Asymptomatic,
}

impl ChestPainType {
    pub const LABELS: [&'static str; 4] = [
        "Typical angina",
        "Atypical angina",
        "Non-anginal pain",
        "Asymptomatic",
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::TypicalAngina),
            1 => Some(Self::AtypicalAngina),
            2 => Some(Self::NonAnginalPain),
            3 => Some(Self::Asymptomatic),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// Resting electrocardiogram category, encoded by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RestingEcg {
    #[default]
    Normal,
    StTWaveAbnormality,
    LeftVentricularHypertrophy,
}

impl RestingEcg {
    pub const LABELS: [&'static str; 3] = [
        "Normal",
        "ST-T wave abnormality",
        "Left ventricular hypertrophy",
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::Normal),
            1 => Some(Self::StTWaveAbnormality),
            2 => Some(Self::LeftVentricularHypertrophy),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// ST-segment slope during peak exercise, encoded by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StSlope {
    Upsloping,
    #[default]
    Flat,
    Downsloping,
}

impl StSlope {
    pub const LABELS: [&'static str; 3] = ["Upsloping", "Flat", "Downsloping"];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Self::Upsloping),
            1 => Some(Self::Flat),
            2 => Some(Self::Downsloping),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }
}

/// Clinical features for one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    /// Age in years (20-100)
    pub age: f64,

    /// Patient sex
    pub sex: Sex,

    /// Chest pain category
    pub chest_pain_type: ChestPainType,

    /// Resting systolic blood pressure in mmHg (90-200)
    pub resting_bp_s: f64,

    /// Serum cholesterol in mg/dl (100-600)
    pub cholesterol: f64,

    /// Fasting blood sugar above 120 mg/dl
    pub fasting_blood_sugar: bool,

    /// Resting ECG category
    pub resting_ecg: RestingEcg,

    /// Maximum heart rate achieved (70-220)
    pub max_heart_rate: f64,

    /// Exercise-induced angina
    pub exercise_angina: bool,

    /// ST depression induced by exercise relative to rest (0.0-6.2)
    pub oldpeak: f64,

    /// ST-segment slope during peak exercise
    pub st_slope: StSlope,
}

impl Default for PatientFeatures {
    fn default() -> Self {
        Self {
            age: 50.0,
            sex: Sex::Male,
            chest_pain_type: ChestPainType::TypicalAngina,
            resting_bp_s: 120.0,
            cholesterol: 200.0,
            fasting_blood_sugar: false,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 150.0,
            exercise_angina: false,
            oldpeak: 1.0,
            st_slope: StSlope::Flat,
        }
    }
}

impl PatientFeatures {
    /// Encode features as a raw vector in training order.
    ///
    /// Order matches [`FEATURE_NAMES`]; categorical fields use their
    /// declaration index, binary flags are 0/1.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.sex.index() as f64,
            self.chest_pain_type.index() as f64,
            self.resting_bp_s,
            self.cholesterol,
            f64::from(u8::from(self.fasting_blood_sugar)),
            self.resting_ecg.index() as f64,
            self.max_heart_rate,
            f64::from(u8::from(self.exercise_angina)),
            self.oldpeak,
            self.st_slope.index() as f64,
        ]
    }

    /// Validate that all numeric features are within the form's bounds.
    ///
    /// # Errors
    /// Returns all violations as user-visible messages.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(20.0..=100.0).contains(&self.age) {
            errors.push(format!("Age {} out of range [20, 100]", self.age));
        }
        if !(90.0..=200.0).contains(&self.resting_bp_s) {
            errors.push(format!(
                "Resting BP {} out of range [90, 200]",
                self.resting_bp_s
            ));
        }
        if !(100.0..=600.0).contains(&self.cholesterol) {
            errors.push(format!(
                "Cholesterol {} out of range [100, 600]",
                self.cholesterol
            ));
        }
        if !(70.0..=220.0).contains(&self.max_heart_rate) {
            errors.push(format!(
                "Max heart rate {} out of range [70, 220]",
                self.max_heart_rate
            ));
        }
        if !(0.0..=6.2).contains(&self.oldpeak) {
            errors.push(format!("ST depression {} out of range [0, 6.2]", self.oldpeak));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// One prediction request as entered in the TUI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientData {
    /// Local identifier, if one was assigned
    pub id: Option<String>,

    /// Clinical features for prediction
    pub features: PatientFeatures,

    /// Timestamp of data entry
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl PatientData {
    /// Create new patient data with the given features.
    #[must_use]
    pub fn new(features: PatientFeatures) -> Self {
        Self {
            id: None,
            features,
            created_at: chrono::Utc::now(),
        }
    }

    /// Create new patient data with an ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>, features: PatientFeatures) -> Self {
        Self {
            id: Some(id.into()),
            features,
            created_at: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_to_vec_order_and_encoding() {
        let features = PatientFeatures {
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
        };

        let vec = features.to_vec();
        assert_eq!(vec.len(), FEATURE_COUNT);
        assert!((vec[0] - 50.0).abs() < f64::EPSILON);
        assert!((vec[1] - 1.0).abs() < f64::EPSILON); // Male
        assert!((vec[2] - 3.0).abs() < f64::EPSILON); // Asymptomatic
        assert!((vec[5] - 0.0).abs() < f64::EPSILON); // fasting blood sugar: No
        assert!((vec[10] - 1.0).abs() < f64::EPSILON); // Flat
    }

    #[test]
    fn test_categorical_index_roundtrip() {
        for i in 0..ChestPainType::LABELS.len() {
            let cp = ChestPainType::from_index(i).expect("valid index");
            assert_eq!(cp.index(), i);
        }
        assert!(ChestPainType::from_index(4).is_none());
        assert!(StSlope::from_index(3).is_none());
        assert!(RestingEcg::from_index(3).is_none());
        assert!(Sex::from_index(2).is_none());
    }

    #[test]
    fn test_validation() {
        assert!(PatientFeatures::default().validate().is_ok());

        let invalid = PatientFeatures {
            age: 15.0,
            cholesterol: 700.0,
            ..Default::default()
        };
        let errors = invalid.validate().expect_err("should be invalid");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_feature_names_match_count() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        assert_eq!(PatientFeatures::default().to_vec().len(), FEATURE_COUNT);
    }
}
