//! # CardioLens
//!
//! Terminal decision-support tool for heart-disease risk assessment.
//!
//! This crate provides:
//! - Risk prediction from a pre-trained classifier over eleven clinical features
//! - Per-feature attribution ranking for every prediction
//! - Natural-language explanations via a local chat model
//! - Terminal UI with a registration/login gate
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient record, assessment, user directory)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (JSON model artifacts, Ollama client)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, PatientData, RiskLabel};

/// Result type for CardioLens operations
pub type Result<T> = std::result::Result<T, CardioLensError>;

/// Main error type for CardioLens
#[derive(Debug, thiserror::Error)]
pub enum CardioLensError {
    #[error("Authentication failed: {0}")]
    Auth(#[from] domain::AuthError),

    #[error("Model artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Model evaluation failed: {0}")]
    Model(#[from] ports::ModelError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
