//! Per-domain ranked IP table. Grounded on the teacher's
//! `load_balancer::health::HealthChecker` (`DashMap`-keyed table,
//! lock-free reads) combined with the `arc-swap` whole-record
//! replacement idiom used elsewhere in this crate for `ServerAddress` —
//! here applied per key instead of to one global value, so a refresh of
//! one domain never blocks readers of another.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use fleet_agent_application::ports::IpPoolPort;
use fleet_agent_domain::DnsRecord;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;

#[derive(Default)]
pub struct InMemoryIpPool {
    records: DashMap<String, Arc<ArcSwap<DnsRecord>>>,
}

impl InMemoryIpPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, domain: &str) -> Option<Arc<DnsRecord>> {
        self.records.get(domain).map(|entry| entry.load_full())
    }
}

impl IpPoolPort for InMemoryIpPool {
    fn get_best_ip(&self, domain: &str) -> Option<IpAddr> {
        self.slot(domain).and_then(|record| record.best_ip())
    }

    fn get_available_ips(&self, domain: &str) -> Vec<IpAddr> {
        self.slot(domain).map(|record| record.available_ips()).unwrap_or_default()
    }

    fn get_next_available_ip(&self, domain: &str, excluded: &HashSet<IpAddr>) -> Option<IpAddr> {
        self.slot(domain).and_then(|record| record.next_available_excluding(excluded))
    }

    fn replace(&self, record: DnsRecord) {
        match self.records.get(&record.domain) {
            Some(slot) => slot.store(Arc::new(record)),
            None => {
                let domain = record.domain.clone();
                self.records.insert(domain, Arc::new(ArcSwap::new(Arc::new(record))));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fleet_agent_domain::IpInfo;
    use std::net::Ipv4Addr;

    fn info(n: u8, available: bool) -> IpInfo {
        IpInfo {
            ip: IpAddr::V4(Ipv4Addr::new(1, 1, 1, n)),
            latency_micros: 100,
            available,
            last_probe_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_domain_returns_none() {
        let pool = InMemoryIpPool::new();
        assert_eq!(pool.get_best_ip("example.com"), None);
        assert!(pool.get_available_ips("example.com").is_empty());
    }

    #[test]
    fn replace_is_atomic_and_visible_immediately() {
        let pool = InMemoryIpPool::new();
        pool.replace(DnsRecord::new("example.com", vec![info(1, true)], true));
        assert_eq!(pool.get_best_ip("example.com"), Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))));

        pool.replace(DnsRecord::new("example.com", vec![info(2, true)], true));
        assert_eq!(pool.get_best_ip("example.com"), Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 2))));
    }

    #[test]
    fn independent_domains_do_not_interfere() {
        let pool = InMemoryIpPool::new();
        pool.replace(DnsRecord::new("a.com", vec![info(1, true)], true));
        pool.replace(DnsRecord::new("b.com", vec![info(2, true)], true));
        assert_eq!(pool.get_best_ip("a.com"), Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))));
        assert_eq!(pool.get_best_ip("b.com"), Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 2))));
    }
}
