//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external artifacts and
//! services:
//! - `artifacts`: serialized classifier/scaler/explainer files on local disk
//! - `ollama`: chat-completion client for explanations

pub mod artifacts;
pub mod ollama;

pub use artifacts::{ArtifactError, ModelArtifacts};
pub use ollama::OllamaClient;
