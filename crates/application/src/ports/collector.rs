use async_trait::async_trait;
use fleet_agent_domain::{CollectParams, DomainError};
use tokio_util::sync::CancellationToken;

/// The sole contract a data-source plug-in must satisfy. The scheduler
/// owns all timing; a collector only knows how to fetch one
/// `(source, data_type)` pair for the params it's handed.
///
/// Implementations must be safe to call concurrently from different
/// executions — typically they hold only an HTTP client and stateless
/// API wrappers, never per-call mutable state.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn collect(&self, ctx: CancellationToken, params: &CollectParams) -> Result<(), DomainError>;
}
