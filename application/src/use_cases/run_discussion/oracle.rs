//! Resilient oracle access.
//!
//! [`ResilientOracle`] wraps a gateway so that every call carries its own
//! timeout and never fails: a provider error or timeout becomes fallback
//! content tagged with the `fallback` provider. Usage and cost are
//! accumulated per model in a [`UsageLedger`].

use crate::ports::llm_gateway::{GatewayError, LlmGateway, OracleRequest, OracleResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub calls: u64,
    pub failures: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cost: f64,
}

/// Per-model usage totals
#[derive(Debug, Default)]
pub struct UsageLedger {
    entries: Mutex<BTreeMap<String, ModelUsage>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, model: &str, response: &OracleResponse) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        let usage = entries.entry(model.to_string()).or_default();
        usage.calls += 1;
        if response.is_fallback() {
            usage.failures += 1;
        }
        usage.prompt_tokens += response.usage.prompt_tokens;
        usage.completion_tokens += response.usage.completion_tokens;
        usage.cost += response.cost;
    }

    pub fn snapshot(&self) -> BTreeMap<String, ModelUsage> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn totals(&self) -> ModelUsage {
        self.snapshot()
            .values()
            .fold(ModelUsage::default(), |mut acc, usage| {
                acc.calls += usage.calls;
                acc.failures += usage.failures;
                acc.prompt_tokens += usage.prompt_tokens;
                acc.completion_tokens += usage.completion_tokens;
                acc.cost += usage.cost;
                acc
            })
    }
}

#[derive(Clone)]
pub struct ResilientOracle {
    gateway: Arc<dyn LlmGateway>,
    timeout: Duration,
    ledger: Arc<UsageLedger>,
}

impl ResilientOracle {
    pub fn new(gateway: Arc<dyn LlmGateway>, timeout: Duration) -> Self {
        Self {
            gateway,
            timeout,
            ledger: Arc::new(UsageLedger::new()),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn LlmGateway> {
        &self.gateway
    }

    pub fn ledger(&self) -> &Arc<UsageLedger> {
        &self.ledger
    }

    /// Generate text; failures come back as fallback responses
    pub async fn ask(&self, request: OracleRequest) -> OracleResponse {
        let result = match tokio::time::timeout(self.timeout, self.gateway.generate(&request)).await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        };
        let response = match result {
            Ok(response) if !response.content.trim().is_empty() => {
                debug!(
                    "Model {} answered ({} tokens)",
                    request.model_id,
                    response.usage.total()
                );
                response
            }
            Ok(_) => {
                warn!("Model {} returned an empty response", request.model_id);
                OracleResponse::fallback(&request.model_id, "empty response")
            }
            Err(e) => {
                warn!("Model {} failed: {}", request.model_id, e);
                OracleResponse::fallback(&request.model_id, &e.to_string())
            }
        };
        self.ledger.record(&request.model_id, &response);
        response
    }

    /// Issue requests together; results keep request order
    pub async fn ask_all(&self, requests: Vec<OracleRequest>) -> Vec<OracleResponse> {
        let futures = requests.into_iter().map(|request| self.ask(request));
        futures::future::join_all(futures).await
    }
}
