use super::{OpenAiCompatibleProvider, ProviderAdapter};
use crate::config::FileProvidersConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, LlmGateway, OracleRequest, OracleResponse,
};
use council_domain::ModelDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Sends each request to the provider that serves its model and prices the
/// response from the catalog.
pub struct RoutingGateway {
    providers: Vec<Arc<dyn ProviderAdapter>>,
    /// Explicit model id → provider index from `[providers.routing]`
    explicit_model_routing: HashMap<String, usize>,
    /// Catalog models keyed by id
    catalog: HashMap<String, ModelDescriptor>,
    default_provider: Option<usize>,
}

impl RoutingGateway {
    pub fn new(
        providers: Vec<Arc<dyn ProviderAdapter>>,
        config: &FileProvidersConfig,
        catalog: &[ModelDescriptor],
    ) -> Self {
        let position = |name: &str| providers.iter().position(|p| p.name() == name);

        let mut explicit_model_routing = HashMap::new();
        for (model_id, provider_name) in &config.routing {
            match position(provider_name) {
                Some(idx) => {
                    explicit_model_routing.insert(model_id.clone(), idx);
                }
                None => debug!(
                    "Routing entry {} -> {} skipped: provider not available",
                    model_id, provider_name
                ),
            }
        }
        let default_provider = config.default.as_deref().and_then(position);

        Self {
            catalog: catalog.iter().map(|m| (m.id.clone(), m.clone())).collect(),
            explicit_model_routing,
            default_provider,
            providers,
        }
    }

    /// Build one OpenAI-compatible provider per configured endpoint.
    ///
    /// Endpoints that need a key but have none resolvable are skipped.
    pub fn from_config(
        config: &FileProvidersConfig,
        catalog: &[ModelDescriptor],
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut providers: Vec<Arc<dyn ProviderAdapter>> = Vec::new();
        for (name, endpoint) in &config.endpoints {
            let api_key = endpoint.resolve_api_key();
            if endpoint.requires_key() && api_key.is_none() {
                debug!("Provider {} skipped: no API key", name);
                continue;
            }
            providers.push(Arc::new(OpenAiCompatibleProvider::new(
                name.clone(),
                endpoint.base_url.clone(),
                api_key.as_deref(),
                endpoint.max_tokens,
                timeout,
            )?));
        }
        Ok(Self::new(providers, config, catalog))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Routing priority:
    ///  1. explicit `[providers.routing]` entry for the model id
    ///  2. the provider named by the model's catalog entry
    ///  3. the configured default provider
    ///  4. the first available provider
    fn resolve_provider(&self, model_id: &str) -> Result<&dyn ProviderAdapter, GatewayError> {
        if let Some(&idx) = self.explicit_model_routing.get(model_id) {
            return Ok(self.providers[idx].as_ref());
        }

        if let Some(descriptor) = self.catalog.get(model_id)
            && let Some(p) = self.providers.iter().find(|p| p.name() == descriptor.provider)
        {
            return Ok(p.as_ref());
        }

        if let Some(idx) = self.default_provider {
            return Ok(self.providers[idx].as_ref());
        }

        self.providers
            .first()
            .map(|p| p.as_ref())
            .ok_or_else(|| GatewayError::ModelNotAvailable("No providers available".to_string()))
    }
}

#[async_trait]
impl LlmGateway for RoutingGateway {
    async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError> {
        let provider = self.resolve_provider(&request.model_id)?;
        let mut response = provider.generate(request).await?;
        if let Some(descriptor) = self.catalog.get(&request.model_id) {
            response.cost = descriptor.estimate_cost(response.usage.total());
        }
        Ok(response)
    }

    /// The configured catalog when there is one, otherwise whatever the
    /// providers list
    async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError> {
        if !self.catalog.is_empty() {
            let mut models: Vec<ModelDescriptor> = self.catalog.values().cloned().collect();
            models.sort_by(|a, b| a.id.cmp(&b.id));
            return Ok(models);
        }

        let mut all_models: Vec<ModelDescriptor> = Vec::new();
        for provider in &self.providers {
            match provider.available_models().await {
                Ok(models) => {
                    for model in models {
                        if !all_models.iter().any(|m| m.id == model.id) {
                            all_models.push(model);
                        }
                    }
                }
                Err(e) => warn!("Could not list models from {}: {}", provider.name(), e),
            }
        }
        Ok(all_models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_application::ports::llm_gateway::TokenUsage;
    use std::collections::BTreeMap;

    // -- Mock ProviderAdapter --------------------------------------------------

    struct MockProvider {
        name: String,
        models: Vec<ModelDescriptor>,
        fail_listing: bool,
    }

    impl MockProvider {
        fn new(name: &str) -> Arc<dyn ProviderAdapter> {
            Self::with_models(name, vec![])
        }

        fn with_models(name: &str, ids: Vec<&str>) -> Arc<dyn ProviderAdapter> {
            Arc::new(Self {
                name: name.to_string(),
                models: ids
                    .into_iter()
                    .map(|id| ModelDescriptor::new(id, name))
                    .collect(),
                fail_listing: false,
            })
        }

        fn broken(name: &str) -> Arc<dyn ProviderAdapter> {
            Arc::new(Self {
                name: name.to_string(),
                models: vec![],
                fail_listing: true,
            })
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError> {
            Ok(OracleResponse {
                content: format!("{} via {}", request.model_id, self.name),
                model: request.model_id.clone(),
                provider: self.name.clone(),
                usage: TokenUsage {
                    prompt_tokens: 900,
                    completion_tokens: 100,
                },
                cost: 0.0,
            })
        }

        async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError> {
            if self.fail_listing {
                return Err(GatewayError::ConnectionError("down".to_string()));
            }
            Ok(self.models.clone())
        }
    }

    // -- Helpers ---------------------------------------------------------------

    fn config(default: Option<&str>, routing: &[(&str, &str)]) -> FileProvidersConfig {
        FileProvidersConfig {
            default: default.map(str::to_string),
            routing: routing
                .iter()
                .map(|(m, p)| (m.to_string(), p.to_string()))
                .collect(),
            endpoints: BTreeMap::new(),
        }
    }

    fn catalog() -> Vec<ModelDescriptor> {
        vec![
            ModelDescriptor::new("claude-sonnet-4.5", "anthropic").with_cost(0.00001),
            ModelDescriptor::new("gpt-5", "openai"),
        ]
    }

    // -- resolve_provider routing priority tests -------------------------------

    #[test]
    fn explicit_routing_takes_highest_priority() {
        let providers = vec![MockProvider::new("ollama"), MockProvider::new("anthropic")];
        let gw = RoutingGateway::new(
            providers,
            &config(None, &[("claude-sonnet-4.5", "ollama")]),
            &catalog(),
        );

        let provider = gw.resolve_provider("claude-sonnet-4.5").unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn catalog_provider_is_used() {
        let providers = vec![MockProvider::new("ollama"), MockProvider::new("anthropic")];
        let gw = RoutingGateway::new(providers, &config(None, &[]), &catalog());

        assert_eq!(gw.resolve_provider("claude-sonnet-4.5").unwrap().name(), "anthropic");
    }

    #[test]
    fn falls_back_to_default_then_first() {
        let providers = vec![MockProvider::new("ollama"), MockProvider::new("anthropic")];
        let gw = RoutingGateway::new(providers, &config(Some("anthropic"), &[]), &catalog());
        // gpt-5 is catalogued under openai, which is not available
        assert_eq!(gw.resolve_provider("gpt-5").unwrap().name(), "anthropic");

        let providers = vec![MockProvider::new("ollama")];
        let gw = RoutingGateway::new(providers, &config(Some("missing"), &[]), &catalog());
        assert_eq!(gw.resolve_provider("unknown-model").unwrap().name(), "ollama");
    }

    #[test]
    fn empty_providers_returns_model_not_available() {
        let gw = RoutingGateway::new(vec![], &config(None, &[]), &catalog());
        let result = gw.resolve_provider("gpt-5");
        assert!(matches!(result, Err(GatewayError::ModelNotAvailable(_))));
    }

    #[test]
    fn unknown_routing_provider_name_is_ignored() {
        let providers = vec![MockProvider::new("ollama")];
        let gw = RoutingGateway::new(
            providers,
            &config(None, &[("gpt-5", "nonexistent-provider")]),
            &[],
        );
        assert!(gw.explicit_model_routing.is_empty());
    }

    // -- LlmGateway trait integration tests ------------------------------------

    #[tokio::test]
    async fn generate_prices_from_catalog() {
        let providers = vec![MockProvider::new("anthropic")];
        let gw = RoutingGateway::new(providers, &config(None, &[]), &catalog());

        let response = gw
            .generate(&OracleRequest::new("claude-sonnet-4.5", "hello"))
            .await
            .unwrap();
        assert_eq!(response.provider, "anthropic");
        assert!((response.cost - 0.01).abs() < 1e-9);
    }

    #[tokio::test]
    async fn available_models_prefers_catalog() {
        let providers = vec![MockProvider::with_models("ollama", vec!["llama3"])];
        let gw = RoutingGateway::new(providers, &config(None, &[]), &catalog());
        let models = gw.available_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "claude-sonnet-4.5");
    }

    #[tokio::test]
    async fn available_models_aggregates_from_all_providers() {
        let providers = vec![
            MockProvider::with_models("ollama", vec!["llama3", "qwen3"]),
            MockProvider::broken("openai"),
            MockProvider::with_models("lab", vec!["qwen3", "mistral"]),
        ];
        let gw = RoutingGateway::new(providers, &config(None, &[]), &[]);

        let models = gw.available_models().await.unwrap();
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["llama3", "qwen3", "mistral"]);
    }

    #[test]
    fn from_config_skips_endpoints_without_keys() {
        let mut config = FileProvidersConfig::default();
        for endpoint in config.endpoints.values_mut() {
            if endpoint.api_key_env.is_some() {
                endpoint.api_key_env = Some("COUNCIL_TEST_KEY_THAT_IS_NEVER_SET".to_string());
            }
        }
        let gw = RoutingGateway::from_config(&config, &[], Duration::from_secs(5)).unwrap();
        assert_eq!(gw.provider_names(), vec!["ollama"]);
    }
}
