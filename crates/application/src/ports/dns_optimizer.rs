use async_trait::async_trait;
use fleet_agent_domain::{DomainError, IpInfo, ProbeConfig};
use std::net::IpAddr;

/// Resolves a domain through multiple upstream DNS servers concurrently
/// and returns the deduplicated union of A-records. A server error is
/// logged and ignored by the implementation; if every server fails the
/// call returns `Err` and the caller leaves the existing pool untouched.
#[async_trait]
pub trait DnsFanoutPort: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DomainError>;
}

/// One-shot reachability/latency probe of a candidate IP.
#[async_trait]
pub trait ProbeEnginePort: Send + Sync {
    async fn probe(&self, domain: &str, ip: IpAddr, config: &ProbeConfig) -> IpInfo;
}
