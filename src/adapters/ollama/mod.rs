//! Ollama adapter: chat-completion client for prediction explanations.
//!
//! Issues one blocking request per assessment against a local Ollama
//! endpoint. The request carries a single user-role message built from a
//! fixed prompt template and a fixed sampling temperature; the raw response
//! text is returned verbatim.
//!
//! The client enforces a request timeout. Callers degrade to "no
//! explanation" on any error; this adapter never retries.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::{Attribution, RiskLabel};
use crate::ports::{ExplanationError, ExplanationModel};

/// Default endpoint of a locally running Ollama server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";

/// Default chat model identifier.
pub const DEFAULT_MODEL: &str = "phi";

/// Fixed sampling temperature for explanation generation.
const TEMPERATURE: f64 = 0.3;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Blocking chat client for a configured Ollama endpoint.
pub struct OllamaClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for the given endpoint and model.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let model = model.into();

        tracing::info!(%endpoint, %model, "Initializing Ollama client");

        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            endpoint,
            model,
        }
    }

    /// Create a client from environment configuration.
    ///
    /// Reads `CARDIOLENS_OLLAMA_URL`, `CARDIOLENS_OLLAMA_MODEL`, and
    /// `CARDIOLENS_LLM_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint = std::env::var("CARDIOLENS_OLLAMA_URL")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model =
            std::env::var("CARDIOLENS_OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout = std::env::var("CARDIOLENS_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);

        Self::new(endpoint, model, timeout)
    }
}

/// Build the fixed prompt embedding the label, probability, and each
/// attribution with its up/down-risk annotation.
fn build_prompt(label: RiskLabel, probability: f64, top_features: &[Attribution]) -> String {
    let label_text = match label {
        RiskLabel::High => "High risk",
        RiskLabel::Low => "Low risk",
    };

    let mut prompt = format!(
        "Explain the feature attribution values and prediction for a heart disease patient.\n\
         Prediction: {label_text} ({:.1}%)\n\
         Top Factors:\n",
        probability * 100.0
    );
    for attribution in top_features {
        let arrow = if attribution.is_risk_increasing() {
            "↑risk"
        } else {
            "↓risk"
        };
        prompt.push_str(&format!(
            "  {}: {:.3} ({arrow})\n",
            attribution.feature,
            attribution.value.abs()
        ));
    }
    prompt
}

impl ExplanationModel for OllamaClient {
    fn summarize(
        &self,
        label: RiskLabel,
        probability: f64,
        top_features: &[Attribution],
    ) -> Result<String, ExplanationError> {
        let prompt = build_prompt(label, probability, top_features);
        let url = format!("{}/api/chat", self.endpoint);

        tracing::debug!(%url, model = %self.model, "Requesting explanation");

        let response = self
            .agent
            .post(&url)
            .send_json(serde_json::json!({
                "model": self.model,
                "messages": [{ "role": "user", "content": prompt }],
                "stream": false,
                "options": { "temperature": TEMPERATURE },
            }))
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ExplanationError::Status(code),
                ureq::Error::Transport(t) => ExplanationError::Request(t.to_string()),
            })?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|e| ExplanationError::MalformedResponse(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_label_probability_and_directions() {
        let top = vec![
            Attribution::new("ST slope", -0.61),
            Attribution::new("chest pain type", 0.468),
            Attribution::new("exercise angina", -0.414),
        ];

        let prompt = build_prompt(RiskLabel::Low, 0.325, &top);

        assert!(prompt.contains("Prediction: Low risk (32.5%)"));
        assert!(prompt.contains("ST slope: 0.610 (↓risk)"));
        assert!(prompt.contains("chest pain type: 0.468 (↑risk)"));
        assert!(prompt.contains("exercise angina: 0.414 (↓risk)"));
    }

    #[test]
    fn test_prompt_high_risk_label() {
        let prompt = build_prompt(RiskLabel::High, 0.9, &[]);
        assert!(prompt.starts_with("Explain the feature attribution values"));
        assert!(prompt.contains("High risk (90.0%)"));
    }

    #[test]
    fn test_endpoint_trailing_slash_stripped() {
        let client = OllamaClient::new(
            "http://localhost:11434/",
            "phi",
            Duration::from_secs(1),
        );
        assert_eq!(client.endpoint, "http://localhost:11434");
    }
}
