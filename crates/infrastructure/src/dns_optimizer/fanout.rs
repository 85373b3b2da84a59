//! Concurrent multi-upstream A-record fan-out, built directly on
//! `hickory-proto` wire types the way the DNS server's own forwarding
//! path builds and parses messages (`dns::forwarding::MessageBuilder` /
//! `ResponseParser`), trimmed to the single record type this agent
//! needs.

use async_trait::async_trait;
use fleet_agent_application::ports::DnsFanoutPort;
use fleet_agent_domain::DomainError;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpDnsFanout {
    upstream_servers: Vec<SocketAddr>,
    per_server_timeout: Duration,
}

impl UdpDnsFanout {
    pub fn new(upstream_servers: Vec<SocketAddr>, per_server_timeout: Duration) -> Self {
        Self {
            upstream_servers,
            per_server_timeout,
        }
    }

    fn build_query(domain: &str) -> Result<Vec<u8>, DomainError> {
        let name = Name::from_str(domain)
            .map_err(|e| DomainError::Other(format!("invalid domain '{domain}': {e}")))?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordType::A);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::Other(format!("failed to serialize DNS query: {e}")))?;
        Ok(buf)
    }

    async fn query_one(&self, server: SocketAddr, query_bytes: &[u8]) -> Result<Vec<IpAddr>, DomainError> {
        let bind_addr: SocketAddr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" }
            .parse()
            .unwrap();
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::TransientNetwork(format!("bind failed: {e}")))?;

        tokio::time::timeout(self.per_server_timeout, socket.send_to(query_bytes, server))
            .await
            .map_err(|_| DomainError::TransientNetwork(format!("timeout sending query to {server}")))?
            .map_err(|e| DomainError::TransientNetwork(format!("send to {server} failed: {e}")))?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let (n, _) = tokio::time::timeout(self.per_server_timeout, socket.recv_from(&mut buf))
            .await
            .map_err(|_| DomainError::TransientNetwork(format!("timeout waiting for {server}")))?
            .map_err(|e| DomainError::TransientNetwork(format!("recv from {server} failed: {e}")))?;
        buf.truncate(n);

        let message = Message::from_vec(&buf)
            .map_err(|e| DomainError::TransientNetwork(format!("malformed response from {server}: {e}")))?;

        let ips = message
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
                _ => None,
            })
            .collect();
        Ok(ips)
    }
}

#[async_trait]
impl DnsFanoutPort for UdpDnsFanout {
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        if self.upstream_servers.is_empty() {
            return Err(DomainError::Other("no upstream DNS servers configured".into()));
        }

        let query_bytes = Self::build_query(domain)?;
        let futures = self
            .upstream_servers
            .iter()
            .map(|server| self.query_one(*server, &query_bytes));
        let results = futures::future::join_all(futures).await;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut all_failed = true;
        for (server, result) in self.upstream_servers.iter().zip(results) {
            match result {
                Ok(ips) => {
                    all_failed = false;
                    for ip in ips {
                        if seen.insert(ip) {
                            merged.push(ip);
                        }
                    }
                }
                Err(e) => {
                    debug!(server = %server, domain, error = %e, "upstream resolve failed");
                }
            }
        }

        if all_failed {
            warn!(domain, "all upstream DNS servers failed");
            return Err(DomainError::TransientNetwork(format!(
                "all {} upstream servers failed for {}",
                self.upstream_servers.len(),
                domain
            )));
        }

        Ok(merged)
    }
}
