use async_trait::async_trait;
use fleet_agent_domain::DomainError;
use serde_json::Value;

/// IP-pinned HTTPS JSON client. Collectors depend on this port rather
/// than on any concrete HTTP stack, so swapping the transport never
/// touches collector code.
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get_json(&self, domain: &str, path: &str, query: &str) -> Result<Value, DomainError>;
}
