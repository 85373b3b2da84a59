//! IP-pinned HTTPS JSON client, grounded on the teacher's
//! `dns::transport::https::HttpsTransport` (shared `reqwest::Client`,
//! rustls TLS, explicit timeout wrapping). IP pinning uses
//! `reqwest::ClientBuilder::resolve()`, which preserves the `Host`
//! header and TLS SNI while dialing the given address — reqwest has no
//! per-request resolve override, so one client is built and cached per
//! `(domain, ip)` pair actually dialed.

use async_trait::async_trait;
use dashmap::DashMap;
use fleet_agent_application::ports::{HttpClientPort, IpPoolPort};
use fleet_agent_domain::DomainError;
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const HTTPS_PORT: u16 = 443;

/// First call tries the pool's ranked best IP; every retry after a
/// failure asks for the next available IP excluding everything already
/// tried, so a dial sequence never repeats an IP within one call.
fn next_attempt(
    pool: &dyn IpPoolPort,
    domain: &str,
    excluded: &std::collections::HashSet<IpAddr>,
) -> Option<IpAddr> {
    if excluded.is_empty() {
        pool.get_best_ip(domain)
    } else {
        pool.get_next_available_ip(domain, excluded)
    }
}

pub struct IpPinnedHttpClient {
    pool: Arc<dyn IpPoolPort>,
    pinned_clients: DashMap<(String, IpAddr), reqwest::Client>,
    os_dns_client: reqwest::Client,
    timeout: Duration,
}

impl IpPinnedHttpClient {
    pub fn new(pool: Arc<dyn IpPoolPort>) -> Self {
        let timeout = Duration::from_secs(30);
        let os_dns_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            pool,
            pinned_clients: DashMap::new(),
            os_dns_client,
            timeout,
        }
    }

    /// Certificate verification is disabled on this client only, per
    /// the spec's note that the control-plane's certificate cannot be
    /// validated against the dialed IP's SNI-less identity. No other
    /// transport in this crate disables verification.
    fn pinned_client(&self, domain: &str, ip: IpAddr) -> reqwest::Client {
        if let Some(client) = self.pinned_clients.get(&(domain.to_string(), ip)) {
            return client.clone();
        }
        let client = reqwest::Client::builder()
            .resolve(domain, SocketAddr::new(ip, HTTPS_PORT))
            .danger_accept_invalid_certs(true)
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        self.pinned_clients.insert((domain.to_string(), ip), client.clone());
        client
    }

    fn build_url(domain: &str, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("https://{domain}{path}")
        } else {
            format!("https://{domain}{path}?{query}")
        }
    }

    async fn try_once(client: &reqwest::Client, url: &str) -> Result<Value, DomainError> {
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::TransientNetwork(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::TransientNetwork(format!("{url} returned HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DomainError::Other(format!("malformed JSON response from {url}: {e}")))
    }
}

/// Retry protocol cap: up to 3 attempts against the IP pool, with
/// exponential backoff between failures starting at ~1s (~1s, then
/// ~2s). The pool being exhausted before the cap is reached ends the
/// loop immediately rather than waiting out the remaining budget.
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 1000;

#[async_trait]
impl HttpClientPort for IpPinnedHttpClient {
    async fn get_json(&self, domain: &str, path: &str, query: &str) -> Result<Value, DomainError> {
        let url = Self::build_url(domain, path, query);
        let mut excluded = std::collections::HashSet::new();
        let mut last_err: Option<DomainError> = None;
        let mut attempt = 0u32;

        while attempt < MAX_ATTEMPTS {
            let Some(ip) = next_attempt(self.pool.as_ref(), domain, &excluded) else {
                break;
            };
            attempt += 1;

            let client = self.pinned_client(domain, ip);
            match Self::try_once(&client, &url).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(domain, %ip, attempt, error = %e, "pinned request failed, excluding IP and retrying");
                    excluded.insert(ip);
                    last_err = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        let backoff = Duration::from_millis(BACKOFF_BASE_MS * 2u64.pow(attempt - 1));
                        tokio::time::sleep(backoff).await;
                    }
                }
            }
        }

        if excluded.is_empty() {
            warn!(domain, "no IP pool entry, falling back to OS DNS");
        }

        match Self::try_once(&self.os_dns_client, &url).await {
            Ok(value) => Ok(value),
            Err(e) => Err(last_err.unwrap_or(e)),
        }
    }
}
