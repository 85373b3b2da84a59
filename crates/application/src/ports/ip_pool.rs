use fleet_agent_domain::DnsRecord;
use std::net::IpAddr;

/// Read/write access to the per-domain ranked IP pool. Writes are
/// atomic whole-record replacements; readers never see a partial
/// update even if a refresh completes mid-request.
pub trait IpPoolPort: Send + Sync {
    fn get_best_ip(&self, domain: &str) -> Option<IpAddr>;
    fn get_available_ips(&self, domain: &str) -> Vec<IpAddr>;
    fn get_next_available_ip(&self, domain: &str, excluded: &std::collections::HashSet<IpAddr>) -> Option<IpAddr>;
    fn replace(&self, record: DnsRecord);
}
