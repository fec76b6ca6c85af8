//! Explanation port: Trait for the natural-language explanation model.

use thiserror::Error;

use crate::domain::{Attribution, RiskLabel};

/// Errors from the chat-model call.
#[derive(Debug, Error)]
pub enum ExplanationError {
    #[error("Chat request failed: {0}")]
    Request(String),

    #[error("Chat endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed chat response: {0}")]
    MalformedResponse(String),
}

/// Trait for turning a numeric prediction summary into text.
///
/// One blocking call per assessment; implementations carry their own timeout.
/// Callers treat a failure as "no explanation available", never as a failed
/// assessment.
pub trait ExplanationModel: Send + Sync {
    /// Generate a short natural-language explanation for a prediction.
    ///
    /// # Errors
    /// Returns error if the request fails, times out, or the response cannot
    /// be parsed.
    fn summarize(
        &self,
        label: RiskLabel,
        probability: f64,
        top_features: &[Attribution],
    ) -> Result<String, ExplanationError>;
}
