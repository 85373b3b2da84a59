//! Reachability/latency probing of candidate IPs. Two probe kinds per
//! [`ProbeConfig`]: a bare TCP connect, and an HTTPS request pinned to
//! the candidate IP via the same `reqwest::ClientBuilder::resolve()`
//! mechanism the IP-pinned HTTP client uses (see
//! `http::ip_pinned_client`).

use async_trait::async_trait;
use fleet_agent_application::ports::ProbeEnginePort;
use fleet_agent_domain::{DomainError, IpInfo, ProbeConfig};
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, warn};

pub struct DefaultProbeEngine;

impl DefaultProbeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultProbeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbeEnginePort for DefaultProbeEngine {
    async fn probe(&self, domain: &str, ip: IpAddr, config: &ProbeConfig) -> IpInfo {
        let now = chrono::Utc::now();
        let start = Instant::now();

        let available = match config {
            ProbeConfig::Tcp { port, .. } => probe_tcp(ip, *port, config.timeout_ms()).await,
            ProbeConfig::Https {
                path,
                method,
                expected_status,
                port,
                ..
            } => probe_https(domain, ip, *port, path, method, *expected_status, config.timeout_ms()).await,
        };

        let latency_micros = start.elapsed().as_micros() as u64;
        if available {
            debug!(domain, %ip, latency_micros, "probe completed");
        } else {
            let err = DomainError::ProbeFailed(domain.to_string(), format!("{ip} unreachable or rejected"));
            warn!(domain, %ip, latency_micros, error = %err, "probe failed, ip marked unavailable");
        }

        IpInfo {
            ip,
            latency_micros,
            available,
            last_probe_at: now,
        }
    }
}

async fn probe_tcp(ip: IpAddr, port: u16, timeout_ms: u64) -> bool {
    let addr = SocketAddr::new(ip, port);
    tokio::time::timeout(Duration::from_millis(timeout_ms), TcpStream::connect(addr))
        .await
        .map(|r| r.is_ok())
        .unwrap_or(false)
}

async fn probe_https(
    domain: &str,
    ip: IpAddr,
    port: u16,
    path: &str,
    method: &str,
    expected_status: u16,
    timeout_ms: u64,
) -> bool {
    let client = match reqwest::Client::builder()
        .resolve(domain, SocketAddr::new(ip, port))
        .danger_accept_invalid_certs(true)
        .timeout(Duration::from_millis(timeout_ms))
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    let url = format!("https://{domain}:{port}{path}");
    let method = method.parse::<reqwest::Method>().unwrap_or(reqwest::Method::GET);

    match client
        .request(method, &url)
        .header(reqwest::header::USER_AGENT, "data-collector-probe/1.0")
        .send()
        .await
    {
        Ok(resp) => resp.status().as_u16() == expected_status,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tcp_probe_unreachable_port_reports_unavailable() {
        // Port 1 is reserved and essentially never accepts connections.
        let available = probe_tcp(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 1, 100).await;
        assert!(!available);
    }
}
