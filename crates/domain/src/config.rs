use crate::errors::ConfigError;
use crate::ip_pool::ProbeConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AgentConfig {
    pub node: NodeConfig,
    pub control_plane: ControlPlaneConfig,
    pub dns_optimizer: DnsOptimizerConfig,
    #[serde(default)]
    pub status_reporter: StatusReporterConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NodeConfig {
    pub node_id: String,
    #[serde(default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: String::new(),
            node_type: default_node_type(),
            region: String::new(),
            namespace: String::new(),
            version: default_version(),
            capabilities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlPlaneConfig {
    #[serde(default = "default_server_ip")]
    pub ip: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            ip: default_server_ip(),
            port: default_server_port(),
            reconcile_interval_secs: default_reconcile_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DnsOptimizerConfig {
    #[serde(default)]
    pub upstream_servers: Vec<String>,
    #[serde(default = "default_dns_timeout_ms")]
    pub per_server_timeout_ms: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub domains: Vec<DomainProbeEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainProbeEntry {
    pub domain: String,
    #[serde(flatten)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusReporterConfig {
    #[serde(default = "default_max_in_flight_reports")]
    pub max_in_flight: usize,
}

impl Default for StatusReporterConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight_reports(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventsConfig {
    #[serde(default = "default_events_bind")]
    pub bind_address: String,
    #[serde(default = "default_events_buffer")]
    pub buffer_size: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            bind_address: default_events_bind(),
            buffer_size: default_events_buffer(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_node_type() -> String {
    "collector".to_string()
}
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
fn default_server_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8090
}
fn default_reconcile_interval() -> u64 {
    60
}
fn default_dns_timeout_ms() -> u64 {
    2000
}
fn default_refresh_interval() -> u64 {
    300
}
fn default_max_in_flight_reports() -> usize {
    16
}
fn default_events_bind() -> String {
    "0.0.0.0:8091".to_string()
}
fn default_events_buffer() -> usize {
    256
}
fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub node_id: Option<String>,
    pub events_bind: Option<String>,
    pub log_level: Option<String>,
}

impl AgentConfig {
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("fleet-agent.toml").exists() {
            Self::from_file("fleet-agent.toml")?
        } else if std::path::Path::new("/etc/fleet-agent/config.toml").exists() {
            Self::from_file("/etc/fleet-agent/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(node_id) = overrides.node_id {
            self.node.node_id = node_id;
        }
        if let Some(bind) = overrides.events_bind {
            self.events.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.node_id.is_empty() {
            return Err(ConfigError::Validation(
                "node.node_id must not be empty".to_string(),
            ));
        }
        if self.dns_optimizer.upstream_servers.is_empty() {
            return Err(ConfigError::Validation(
                "dns_optimizer.upstream_servers must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_node_id() {
        let config = AgentConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_minimal_config() {
        let mut config = AgentConfig::default();
        config.node.node_id = "n1".to_string();
        config.dns_optimizer.upstream_servers = vec!["8.8.8.8:53".to_string()];
        assert!(config.validate().is_ok());
    }
}
