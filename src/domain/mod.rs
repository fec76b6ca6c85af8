//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external service dependencies.
//! All types are serializable and implement strict validation.

mod assessment;
mod auth;
mod patient;

pub use assessment::{Assessment, Attribution, ModelOutput, RiskLabel};
pub use auth::{AuthError, UserDirectory, UserRecord};
pub use patient::{
    ChestPainType, PatientData, PatientFeatures, RestingEcg, Sex, StSlope, FEATURE_COUNT,
    FEATURE_NAMES,
};
