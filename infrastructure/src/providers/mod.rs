//! Oracle providers.
//!
//! Each configured endpoint becomes a [`ProviderAdapter`]; the
//! [`RoutingGateway`] picks one per request and implements the application's
//! [`LlmGateway`](council_application::LlmGateway) port.

pub mod openai_compatible;
pub mod routing;

pub use openai_compatible::OpenAiCompatibleProvider;
pub use routing::RoutingGateway;

use async_trait::async_trait;
use council_application::ports::llm_gateway::{GatewayError, OracleRequest, OracleResponse};
use council_domain::ModelDescriptor;

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider name as used in the catalog and `[providers.routing]`
    fn name(&self) -> &str;
    async fn generate(&self, request: &OracleRequest) -> Result<OracleResponse, GatewayError>;
    async fn available_models(&self) -> Result<Vec<ModelDescriptor>, GatewayError>;
}
