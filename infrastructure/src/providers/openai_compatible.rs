//! OpenAI-compatible chat completions provider.
//!
//! Covers OpenAI itself and every server exposing the same protocol
//! (Anthropic's compatibility endpoint, Ollama, vLLM, OpenRouter, LM Studio).

use super::ProviderAdapter;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, OracleRequest, OracleResponse, TokenUsage,
};
use council_domain::ModelDescriptor;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiCompatibleProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    max_tokens: u32,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<&str>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| GatewayError::Other(format!("invalid API key header: {e}")))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_tokens,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn map_send_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn map_status(status: StatusCode, model: &str, body: &str) -> GatewayError {
    let detail: String = body.chars().take(200).collect();
    match status {
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(model.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("HTTP {status}: {detail}")),
    }
}

/// Request body for `/chat/completions`
fn chat_body(request: &OracleRequest, default_max_tokens: u32) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let mut body = json!({
        "model": request.model_id,
        "messages": messages,
        "max_tokens": request.max_tokens.unwrap_or(default_max_tokens),
    });
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

/// Pull the first choice's text and the token usage out of a completion
fn parse_completion(body: &Value) -> Result<(String, TokenUsage), GatewayError> {
    if let Some(message) = body["error"]["message"].as_str() {
        return Err(GatewayError::RequestFailed(message.to_string()));
    }
    let content = match &body["choices"][0]["message"]["content"] {
        Value::String(text) => text.clone(),
        // Some servers return content parts
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join(""),
        _ => {
            return Err(GatewayError::InvalidResponse(
                "completion has no message content".to_string(),
            ));
        }
    };
    let usage = TokenUsage {
        prompt_tokens: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: body["usage"]["completion_tokens"].as_u64().unwrap_or(0),
    };
    Ok((content, usage))
}

fn parse_model_list(provider: &str, body: &Value) -> Vec<ModelDescriptor> {
    body["data"]
        .as_array()
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m["id"].as_str())
                .filter(|id| !id.trim().is_empty())
                .map(|id| ModelDescriptor::new(id, provider))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ProviderAdapter for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError> {
        let response = self
            .client
            .post(self.url("chat/completions"))
            .json(&chat_body(request, self.max_tokens))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &request.model_id, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let (content, usage) = parse_completion(&body)?;
        debug!(
            "{} answered for {} ({} tokens)",
            self.name,
            request.model_id,
            usage.total()
        );

        Ok(OracleResponse {
            content,
            model: body["model"]
                .as_str()
                .unwrap_or(&request.model_id)
                .to_string(),
            provider: self.name.clone(),
            usage,
            cost: 0.0,
        })
    }

    async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError> {
        let response = self
            .client
            .get(self.url("models"))
            .send()
            .await
            .map_err(map_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, "models", &body));
        }
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        Ok(parse_model_list(&self.name, &body))
    }
}
