use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::net::IpAddr;

/// One probed candidate IP for a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct IpInfo {
    pub ip: IpAddr,
    pub latency_micros: u64,
    pub available: bool,
    pub last_probe_at: DateTime<Utc>,
}

/// Total order used to sort a domain's candidate IPs: available IPs
/// first, then ascending latency. Ties are otherwise stable.
fn ip_info_order(a: &IpInfo, b: &IpInfo) -> Ordering {
    match (a.available, b.available) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.latency_micros.cmp(&b.latency_micros),
    }
}

/// The per-domain record maintained by the DNS optimizer: an ordered
/// IP list plus the outcome of the refresh that produced it. Replaced
/// atomically as a whole — readers never observe a partially-updated
/// record.
#[derive(Debug, Clone)]
pub struct DnsRecord {
    pub domain: String,
    pub ip_list: Vec<IpInfo>,
    pub resolved_at: DateTime<Utc>,
    pub success: bool,
}

impl DnsRecord {
    pub fn new(domain: impl Into<String>, mut ip_list: Vec<IpInfo>, success: bool) -> Self {
        ip_list.sort_by(ip_info_order);
        Self {
            domain: domain.into(),
            ip_list,
            resolved_at: Utc::now(),
            success,
        }
    }

    pub fn best_ip(&self) -> Option<IpAddr> {
        self.ip_list.iter().find(|i| i.available).map(|i| i.ip)
    }

    pub fn available_ips(&self) -> Vec<IpAddr> {
        self.ip_list
            .iter()
            .filter(|i| i.available)
            .map(|i| i.ip)
            .collect()
    }

    pub fn next_available_excluding(&self, excluded: &std::collections::HashSet<IpAddr>) -> Option<IpAddr> {
        self.ip_list
            .iter()
            .find(|i| i.available && !excluded.contains(&i.ip))
            .map(|i| i.ip)
    }
}

/// How a candidate IP is probed for reachability/latency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "probe_type", rename_all = "lowercase")]
pub enum ProbeConfig {
    Tcp {
        #[serde(default = "default_tcp_port")]
        port: u16,
        #[serde(default = "default_tcp_timeout_ms")]
        timeout_ms: u64,
    },
    Https {
        path: String,
        #[serde(default = "default_method")]
        method: String,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
        #[serde(default = "default_https_timeout_ms")]
        timeout_ms: u64,
        #[serde(default = "default_https_port")]
        port: u16,
    },
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig::Tcp {
            port: default_tcp_port(),
            timeout_ms: default_tcp_timeout_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout_ms(&self) -> u64 {
        match self {
            ProbeConfig::Tcp { timeout_ms, .. } => *timeout_ms,
            ProbeConfig::Https { timeout_ms, .. } => *timeout_ms,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            ProbeConfig::Tcp { port, .. } => *port,
            ProbeConfig::Https { port, .. } => *port,
        }
    }
}

fn default_tcp_port() -> u16 {
    443
}
fn default_tcp_timeout_ms() -> u64 {
    2000
}
fn default_https_port() -> u16 {
    443
}
fn default_https_timeout_ms() -> u64 {
    3000
}
fn default_method() -> String {
    "GET".to_string()
}
fn default_expected_status() -> u16 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;

    fn ip(n: u8, latency: u64, available: bool) -> IpInfo {
        IpInfo {
            ip: IpAddr::V4(Ipv4Addr::new(1, 1, 1, n)),
            latency_micros: latency,
            available,
            last_probe_at: Utc::now(),
        }
    }

    #[test]
    fn sorts_available_first_then_by_latency() {
        let record = DnsRecord::new(
            "example.com",
            vec![ip(3, 5, false), ip(1, 30, true), ip(2, 10, true)],
            true,
        );
        let ips: Vec<u8> = record
            .ip_list
            .iter()
            .map(|i| match i.ip {
                IpAddr::V4(v4) => v4.octets()[3],
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ips, vec![2, 1, 3]);
    }

    #[test]
    fn next_available_excludes_given_set() {
        let record = DnsRecord::new(
            "example.com",
            vec![ip(1, 10, true), ip(2, 20, true), ip(3, 30, true)],
            true,
        );
        let mut excluded = HashSet::new();
        excluded.insert(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)));
        let next = record.next_available_excluding(&excluded);
        assert_eq!(next, Some(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 2))));
    }

    #[test]
    fn next_available_empty_when_all_excluded() {
        let record = DnsRecord::new("example.com", vec![ip(1, 10, true)], true);
        let mut excluded = HashSet::new();
        excluded.insert(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)));
        assert_eq!(record.next_available_excluding(&excluded), None);
    }
}
