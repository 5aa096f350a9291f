//! LLM Gateway port
//!
//! Defines the single oracle capability the council depends on: turn a prompt
//! into text with a named model.

use async_trait::async_trait;
use council_domain::{AgentType, ModelDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider tag carried by synthesized fallback responses
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// One generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub model_id: String,
    pub prompt: String,
    pub system: Option<String>,
    /// Role the request is made for, used by providers that route by role
    pub agent_type: Option<AgentType>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl OracleRequest {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            system: None,
            agent_type: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn for_agent(mut self, agent_type: AgentType) -> Self {
        self.agent_type = Some(agent_type);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleResponse {
    pub content: String,
    pub model: String,
    pub provider: String,
    pub usage: TokenUsage,
    pub cost: f64,
}

impl OracleResponse {
    /// Deterministic stand-in returned when a provider fails
    pub fn fallback(model: impl Into<String>, reason: &str) -> Self {
        let model = model.into();
        Self {
            content: format!("[{model} unavailable: {reason}]"),
            model,
            provider: FALLBACK_PROVIDER.to_string(),
            usage: TokenUsage::default(),
            cost: 0.0,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.provider == FALLBACK_PROVIDER
    }
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer. They may
/// fail; the application wraps them so callers never see the error.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate text for a request
    async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError>;

    /// The model catalog this gateway can serve
    async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_tagged() {
        let response = OracleResponse::fallback("gpt-5", "timeout");
        assert!(response.is_fallback());
        assert_eq!(response.provider, "fallback");
        assert_eq!(response.cost, 0.0);
        assert!(response.content.contains("gpt-5"));
    }

    #[test]
    fn test_request_builder() {
        let request = OracleRequest::new("m", "hi")
            .with_system("be brief")
            .for_agent(AgentType::Analyst)
            .with_max_tokens(200);
        assert_eq!(request.system.as_deref(), Some("be brief"));
        assert_eq!(request.agent_type, Some(AgentType::Analyst));
        assert_eq!(request.max_tokens, Some(200));
    }
}
