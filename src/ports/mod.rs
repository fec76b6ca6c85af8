//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model artifacts, chat model).

mod explanation;
mod model;

pub use explanation::{ExplanationError, ExplanationModel};
pub use model::{AttributionExplainer, ModelError, RiskModel};
