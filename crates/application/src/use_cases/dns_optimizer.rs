use crate::ports::{DnsFanoutPort, IpPoolPort, ProbeEnginePort};
use fleet_agent_domain::{DnsRecord, ProbeConfig};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// One domain this agent keeps an optimized IP pool for.
#[derive(Debug, Clone)]
pub struct DomainTarget {
    pub domain: String,
    pub probe: ProbeConfig,
}

/// Refreshes the ranked IP pool for a fixed set of domains: fan out a
/// DNS query to every configured upstream, probe every returned IP
/// concurrently, then replace the pool record for that domain as one
/// atomic unit. A domain whose fan-out fails entirely keeps its
/// previous pool untouched — a transient resolver outage must not empty
/// a pool that was working a moment ago.
pub struct DnsOptimizer {
    fanout: Arc<dyn DnsFanoutPort>,
    prober: Arc<dyn ProbeEnginePort>,
    pool: Arc<dyn IpPoolPort>,
    domains: Vec<DomainTarget>,
}

impl DnsOptimizer {
    pub fn new(
        fanout: Arc<dyn DnsFanoutPort>,
        prober: Arc<dyn ProbeEnginePort>,
        pool: Arc<dyn IpPoolPort>,
        domains: Vec<DomainTarget>,
    ) -> Self {
        Self {
            fanout,
            prober,
            pool,
            domains,
        }
    }

    /// Refreshes every configured domain concurrently.
    pub async fn refresh_all(&self) {
        let futures = self.domains.iter().map(|target| self.refresh_domain(target));
        join_all(futures).await;
    }

    async fn refresh_domain(&self, target: &DomainTarget) {
        let ips = match self.fanout.resolve(&target.domain).await {
            Ok(ips) if !ips.is_empty() => ips,
            Ok(_) => {
                warn!(domain = %target.domain, "dns fan-out returned no records, pool untouched");
                return;
            }
            Err(e) => {
                warn!(domain = %target.domain, error = %e, "dns fan-out failed, pool untouched");
                return;
            }
        };

        let probes = ips
            .into_iter()
            .map(|ip| self.prober.probe(&target.domain, ip, &target.probe));
        let infos = join_all(probes).await;

        let available = infos.iter().filter(|i| i.available).count();
        let record = DnsRecord::new(target.domain.clone(), infos, available > 0);
        info!(domain = %target.domain, available, "dns pool refreshed");
        self.pool.replace(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeDnsFanout, FakePool, FakeProber};
    use std::net::{IpAddr, Ipv4Addr};

    fn target(domain: &str) -> DomainTarget {
        DomainTarget {
            domain: domain.to_string(),
            probe: ProbeConfig::default(),
        }
    }

    #[tokio::test]
    async fn successful_refresh_replaces_pool() {
        let fanout = Arc::new(FakeDnsFanout::resolving(vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))]));
        let prober = Arc::new(FakeProber::always_available());
        let pool = Arc::new(FakePool::default());
        let optimizer = DnsOptimizer::new(fanout, prober, pool.clone(), vec![target("example.com")]);

        optimizer.refresh_all().await;
        assert_eq!(pool.replace_count(), 1);
    }

    #[tokio::test]
    async fn failed_fanout_leaves_pool_untouched() {
        let fanout = Arc::new(FakeDnsFanout::failing());
        let prober = Arc::new(FakeProber::always_available());
        let pool = Arc::new(FakePool::default());
        let optimizer = DnsOptimizer::new(fanout, prober, pool.clone(), vec![target("example.com")]);

        optimizer.refresh_all().await;
        assert_eq!(pool.replace_count(), 0);
    }

    #[tokio::test]
    async fn empty_resolution_leaves_pool_untouched() {
        let fanout = Arc::new(FakeDnsFanout::resolving(vec![]));
        let prober = Arc::new(FakeProber::always_available());
        let pool = Arc::new(FakePool::default());
        let optimizer = DnsOptimizer::new(fanout, prober, pool.clone(), vec![target("example.com")]);

        optimizer.refresh_all().await;
        assert_eq!(pool.replace_count(), 0);
    }
}
